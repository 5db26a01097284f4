//! 인메모리 저장소 구현.
//!
//! 데이터베이스 없이 엔진을 구동하거나 테스트할 때 사용합니다.
//! 모든 상태는 프로세스 수명 동안만 유지됩니다.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goldbot_core::{TradeRecord, TradeStatus, UserTradingSettings};
use rust_decimal::Decimal;

use crate::error::{DataError, DataResult};
use crate::settings::UserSettingsStore;
use crate::trades::TradeStore;

/// 인메모리 사용자 설정 저장소.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<HashMap<i64, UserTradingSettings>>,
}

impl MemorySettingsStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 설정을 직접 주입합니다 (테스트용).
    pub fn set(&self, user_id: i64, settings: UserTradingSettings) {
        self.settings.lock().unwrap().insert(user_id, settings);
    }
}

#[async_trait]
impl UserSettingsStore for MemorySettingsStore {
    async fn load(&self, user_id: i64) -> DataResult<UserTradingSettings> {
        Ok(self
            .settings
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, user_id: i64, settings: &UserTradingSettings) -> DataResult<()> {
        self.settings
            .lock()
            .unwrap()
            .insert(user_id, settings.clone());
        Ok(())
    }
}

/// 인메모리 체결 기록 저장소.
#[derive(Default)]
pub struct MemoryTradeStore {
    trades: Mutex<HashMap<u64, TradeRecord>>,
    fail_writes: Mutex<bool>,
}

impl MemoryTradeStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 쓰기 실패 모드를 설정합니다 (영속 실패 시나리오 테스트용).
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// 티켓의 레코드를 조회합니다 (테스트 검증용).
    pub fn get(&self, ticket: u64) -> Option<TradeRecord> {
        self.trades.lock().unwrap().get(&ticket).cloned()
    }

    /// 저장된 레코드 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.trades.lock().unwrap().len()
    }

    /// 저장된 레코드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.trades.lock().unwrap().is_empty()
    }

    fn check_writable(&self) -> DataResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(DataError::InvalidRecord(
                "쓰기 실패 모드가 활성화됨".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn insert_open(&self, record: &TradeRecord) -> DataResult<()> {
        self.check_writable()?;
        self.trades
            .lock()
            .unwrap()
            .insert(record.ticket, record.clone());
        Ok(())
    }

    async fn mark_closed(
        &self,
        ticket: u64,
        close_price: Option<Decimal>,
        profit: Option<Decimal>,
        close_time: DateTime<Utc>,
    ) -> DataResult<()> {
        self.check_writable()?;
        let mut trades = self.trades.lock().unwrap();
        let record = trades
            .get_mut(&ticket)
            .ok_or_else(|| DataError::NotFound(format!("ticket {}", ticket)))?;
        record.status = TradeStatus::Closed;
        record.close_price = close_price;
        record.profit = profit;
        record.close_time = Some(close_time);
        Ok(())
    }

    async fn find_by_ticket(&self, ticket: u64) -> DataResult<Option<TradeRecord>> {
        Ok(self.trades.lock().unwrap().get(&ticket).cloned())
    }

    async fn list_open(&self, user_id: i64) -> DataResult<Vec<TradeRecord>> {
        Ok(self
            .trades
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id && r.status == TradeStatus::Open)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldbot_core::Side;
    use rust_decimal_macros::dec;

    fn open_record(user_id: i64, ticket: u64) -> TradeRecord {
        TradeRecord {
            user_id,
            ticket,
            symbol: "XAUUSD".to_string(),
            side: Side::Buy,
            lot: dec!(0.10),
            open_price: dec!(2000.5),
            close_price: None,
            stop_loss: Some(dec!(2000.0)),
            take_profit: Some(dec!(2001.5)),
            profit: None,
            status: TradeStatus::Open,
            open_time: Utc::now(),
            close_time: None,
            comment: "EMA12/26 + RSI14".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_close() {
        let store = MemoryTradeStore::new();
        store.insert_open(&open_record(1, 100)).await.unwrap();
        assert_eq!(store.list_open(1).await.unwrap().len(), 1);

        store
            .mark_closed(100, Some(dec!(2001.5)), Some(dec!(10.0)), Utc::now())
            .await
            .unwrap();
        assert!(store.list_open(1).await.unwrap().is_empty());

        let record = store.get(100).unwrap();
        assert_eq!(record.status, TradeStatus::Closed);
        assert_eq!(record.profit, Some(dec!(10.0)));
    }

    #[tokio::test]
    async fn test_mark_closed_unknown_ticket() {
        let store = MemoryTradeStore::new();
        let result = store.mark_closed(999, None, None, Utc::now()).await;
        assert!(matches!(result, Err(DataError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_settings_default_when_absent() {
        let store = MemorySettingsStore::new();
        let settings = store.load(42).await.unwrap();
        assert_eq!(settings.risk_percentage, 2.0);

        let custom = UserTradingSettings {
            risk_percentage: 1.0,
            ..Default::default()
        };
        store.save(42, &custom).await.unwrap();
        assert_eq!(store.load(42).await.unwrap().risk_percentage, 1.0);
    }
}
