//! 체결 기록 저장소.
//!
//! 주문 디스패치 성공 시 OPEN 레코드를 생성하고, 포지션 생명주기
//! 트래커가 청산을 확인하면 CLOSED로 갱신합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goldbot_core::{TradeRecord, TradeStatus};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::{DataError, DataResult};

/// 체결 기록 저장소 인터페이스.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// 새 OPEN 체결 레코드를 기록합니다.
    async fn insert_open(&self, record: &TradeRecord) -> DataResult<()>;

    /// 티켓의 체결 레코드를 CLOSED로 갱신합니다.
    ///
    /// 청산 세부 정보를 확인하지 못한 경우 `close_price`와 `profit`에
    /// `None`을 전달합니다 (상태와 청산 시간만 기록됨).
    async fn mark_closed(
        &self,
        ticket: u64,
        close_price: Option<Decimal>,
        profit: Option<Decimal>,
        close_time: DateTime<Utc>,
    ) -> DataResult<()>;

    /// 티켓으로 체결 레코드를 조회합니다.
    async fn find_by_ticket(&self, ticket: u64) -> DataResult<Option<TradeRecord>>;

    /// 사용자의 미청산 체결 레코드를 조회합니다.
    async fn list_open(&self, user_id: i64) -> DataResult<Vec<TradeRecord>>;
}

/// trades 테이블의 데이터베이스 표현.
#[derive(Debug, Clone, FromRow)]
struct TradeRow {
    user_id: i64,
    ticket: i64,
    symbol: String,
    side: String,
    lot: Decimal,
    open_price: Decimal,
    close_price: Option<Decimal>,
    stop_loss: Option<Decimal>,
    take_profit: Option<Decimal>,
    profit: Option<Decimal>,
    status: String,
    open_time: DateTime<Utc>,
    close_time: Option<DateTime<Utc>>,
    comment: Option<String>,
}

impl TradeRow {
    fn into_record(self) -> DataResult<TradeRecord> {
        let side = self
            .side
            .parse()
            .map_err(|e: String| DataError::InvalidRecord(e))?;
        let status: TradeStatus = self
            .status
            .parse()
            .map_err(|e: String| DataError::InvalidRecord(e))?;

        Ok(TradeRecord {
            user_id: self.user_id,
            ticket: self.ticket as u64,
            symbol: self.symbol,
            side,
            lot: self.lot,
            open_price: self.open_price,
            close_price: self.close_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            profit: self.profit,
            status,
            open_time: self.open_time,
            close_time: self.close_time,
            comment: self.comment.unwrap_or_default(),
        })
    }
}

/// PostgreSQL 기반 체결 기록 저장소.
pub struct PgTradeStore {
    pool: PgPool,
}

impl PgTradeStore {
    /// 커넥션 풀로 새 저장소를 생성합니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TradeStore for PgTradeStore {
    async fn insert_open(&self, record: &TradeRecord) -> DataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trades (
                user_id, ticket, symbol, side, lot,
                open_price, stop_loss, take_profit,
                status, open_time, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.user_id)
        .bind(record.ticket as i64)
        .bind(&record.symbol)
        .bind(record.side.as_str())
        .bind(record.lot)
        .bind(record.open_price)
        .bind(record.stop_loss)
        .bind(record.take_profit)
        .bind(record.status.as_str())
        .bind(record.open_time)
        .bind(&record.comment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_closed(
        &self,
        ticket: u64,
        close_price: Option<Decimal>,
        profit: Option<Decimal>,
        close_time: DateTime<Utc>,
    ) -> DataResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE trades
            SET status = 'CLOSED', close_price = $2, profit = $3, close_time = $4
            WHERE ticket = $1 AND status = 'OPEN'
            "#,
        )
        .bind(ticket as i64)
        .bind(close_price)
        .bind(profit)
        .bind(close_time)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::NotFound(format!("ticket {}", ticket)));
        }

        Ok(())
    }

    async fn find_by_ticket(&self, ticket: u64) -> DataResult<Option<TradeRecord>> {
        let row = sqlx::query_as::<_, TradeRow>(
            r#"
            SELECT
                user_id, ticket, symbol, side, lot,
                open_price, close_price, stop_loss, take_profit,
                profit, status, open_time, close_time, comment
            FROM trades
            WHERE ticket = $1
            "#,
        )
        .bind(ticket as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TradeRow::into_record).transpose()
    }

    async fn list_open(&self, user_id: i64) -> DataResult<Vec<TradeRecord>> {
        let rows = sqlx::query_as::<_, TradeRow>(
            r#"
            SELECT
                user_id, ticket, symbol, side, lot,
                open_price, close_price, stop_loss, take_profit,
                profit, status, open_time, close_time, comment
            FROM trades
            WHERE user_id = $1 AND status = 'OPEN'
            ORDER BY open_time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TradeRow::into_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldbot_core::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion() {
        let row = TradeRow {
            user_id: 7,
            ticket: 100001,
            symbol: "XAUUSD".to_string(),
            side: "BUY".to_string(),
            lot: dec!(0.10),
            open_price: dec!(2000.5),
            close_price: None,
            stop_loss: Some(dec!(2000.0)),
            take_profit: Some(dec!(2001.5)),
            profit: None,
            status: "OPEN".to_string(),
            open_time: Utc::now(),
            close_time: None,
            comment: Some("EMA12/26 + RSI14".to_string()),
        };
        let record = row.into_record().unwrap();
        assert_eq!(record.side, Side::Buy);
        assert_eq!(record.status, TradeStatus::Open);
        assert_eq!(record.ticket, 100001);
    }

    #[test]
    fn test_row_conversion_rejects_unknown_side() {
        let row = TradeRow {
            user_id: 7,
            ticket: 100001,
            symbol: "XAUUSD".to_string(),
            side: "HOLD".to_string(),
            lot: dec!(0.10),
            open_price: dec!(2000.5),
            close_price: None,
            stop_loss: None,
            take_profit: None,
            profit: None,
            status: "OPEN".to_string(),
            open_time: Utc::now(),
            close_time: None,
            comment: None,
        };
        assert!(matches!(
            row.into_record(),
            Err(DataError::InvalidRecord(_))
        ));
    }
}
