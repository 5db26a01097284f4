//! 포지션 생명주기 트래커.
//!
//! 디스패처가 접수한 티켓을 메모리에 보관하고, 독립 루프에서 터미널의
//! 미청산 포지션 집합과 대조합니다. 집합에서 사라진 티켓은 체결 내역과
//! 정확히 한 번 조정됩니다:
//! - 티켓과 일치하는 청산(OUT/OUT_BY) 체결을 우선 사용
//! - 없으면 일치하는 임의의 체결로 대체
//! - 그래도 없으면 세부 정보 없이 청산으로 기록
//!
//! 조정 성공 여부와 무관하게 티켓은 추적 집합에서 제거되며, 티켓 하나의
//! 실패가 다른 티켓의 조정을 막지 않습니다. 청산 기록 영속화가 실패하면
//! 운영자 경보를 보내되, 청산 알림은 그대로 전송합니다.

use std::collections::HashSet;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use goldbot_core::{Deal, EngineError, EngineResult, TrackedPosition};
use goldbot_data::TradeStore;
use goldbot_gateway::MarketDataGateway;
use goldbot_notification::{Notification, NotificationEvent, NotificationSender};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// 청산 체결 검색 윈도우: 접수 시점보다 이만큼 이전부터
const HISTORY_LOOKBACK: Duration = Duration::hours(1);
/// 청산 체결 검색 윈도우: 현재 시점보다 이만큼 이후까지
const HISTORY_LOOKAHEAD: Duration = Duration::minutes(5);

/// 포지션 생명주기 트래커.
pub struct PositionTracker {
    gateway: Arc<dyn MarketDataGateway>,
    trades: Arc<dyn TradeStore>,
    notifier: Arc<dyn NotificationSender>,
    positions: Mutex<HashMap<u64, TrackedPosition>>,
}

impl PositionTracker {
    /// 새 트래커를 생성합니다.
    pub fn new(
        gateway: Arc<dyn MarketDataGateway>,
        trades: Arc<dyn TradeStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            gateway,
            trades,
            notifier,
            positions: Mutex::new(HashMap::new()),
        }
    }

    /// 접수된 포지션을 추적 집합에 등록합니다.
    pub async fn track(&self, position: TrackedPosition) {
        let mut positions = self.positions.lock().await;
        debug!(
            user_id = position.user_id,
            ticket = position.ticket,
            "Tracking position"
        );
        positions.insert(position.ticket, position);
    }

    /// 현재 추적 중인 티켓 수를 반환합니다.
    pub async fn tracked_count(&self) -> usize {
        self.positions.lock().await.len()
    }

    /// 티켓이 추적 중인지 확인합니다.
    pub async fn is_tracked(&self, ticket: u64) -> bool {
        self.positions.lock().await.contains_key(&ticket)
    }

    /// 추적 사이클을 한 번 실행합니다.
    ///
    /// 터미널 조회가 실패하면 추적 집합을 그대로 두고 다음 사이클로
    /// 넘깁니다 (닫혔다고 단정하지 않음).
    pub async fn run_cycle(&self, symbol: &str) -> EngineResult<()> {
        let tracked: Vec<TrackedPosition> = {
            let positions = self.positions.lock().await;
            positions.values().cloned().collect()
        };
        if tracked.is_empty() {
            return Ok(());
        }

        let open_tickets: HashSet<u64> = self
            .gateway
            .open_positions(symbol)
            .await
            .map_err(|e| EngineError::DataUnavailable(format!("open positions: {}", e)))?
            .into_iter()
            .map(|p| p.ticket)
            .collect();

        for position in tracked {
            if open_tickets.contains(&position.ticket) {
                continue;
            }

            if let Err(e) = self.reconcile(symbol, &position).await {
                error!(
                    ticket = position.ticket,
                    error = %e,
                    "Failed to reconcile closed position"
                );
            }

            // 조정 성공 여부와 무관하게 재시도하지 않는다
            self.positions.lock().await.remove(&position.ticket);
        }

        Ok(())
    }

    /// 사라진 티켓을 체결 내역과 조정합니다.
    async fn reconcile(&self, symbol: &str, position: &TrackedPosition) -> EngineResult<()> {
        let now = Utc::now();
        let from = position.opened_at - HISTORY_LOOKBACK;
        let to = now + HISTORY_LOOKAHEAD;

        let deals = self
            .gateway
            .trade_history(symbol, from, to)
            .await
            .map_err(|e| EngineError::DataUnavailable(format!("trade history: {}", e)))?;

        let closing = find_closing_deal(&deals, position.ticket);
        let persisted = match &closing {
            Some(deal) => {
                info!(
                    ticket = position.ticket,
                    close_price = %deal.price,
                    profit = %deal.profit,
                    "Position closed"
                );
                self.trades
                    .mark_closed(position.ticket, Some(deal.price), Some(deal.profit), deal.time)
                    .await
            }
            None => {
                warn!(
                    ticket = position.ticket,
                    "Position closed but no matching deal found"
                );
                self.trades
                    .mark_closed(position.ticket, None, None, now)
                    .await
            }
        };

        // 청산 사실은 이미 확정되었으므로 영속화가 실패해도 알림은 보낸다
        self.send_exit_notification(position, closing.as_ref()).await;

        if let Err(e) = persisted {
            error!(
                ticket = position.ticket,
                error = %e,
                "Failed to persist position close"
            );
            self.alert_operator(position.ticket, &e.to_string()).await;
            return Err(EngineError::Persistence(e.to_string()));
        }

        if closing.is_none() {
            return Err(EngineError::ReconciliationMiss(format!(
                "ticket {}",
                position.ticket
            )));
        }
        Ok(())
    }

    /// 운영자 채널로 청산 기록 실패를 보고합니다. 전송 실패는 무시합니다.
    async fn alert_operator(&self, ticket: u64, message: &str) {
        let notification = Notification::new(NotificationEvent::SystemError {
            component: "tracker".to_string(),
            message: format!("티켓 {} 청산 기록 실패: {}", ticket, message),
        });
        if let Err(e) = self.notifier.send(&notification).await {
            warn!(ticket, error = %e, "Operator alert failed");
        }
    }

    /// 청산 알림을 전송합니다. 전송 실패는 기록만 하고 무시합니다.
    async fn send_exit_notification(&self, position: &TrackedPosition, deal: Option<&Deal>) {
        let record = match self.trades.find_by_ticket(position.ticket).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(ticket = position.ticket, "No trade record for notification");
                return;
            }
            Err(e) => {
                warn!(ticket = position.ticket, error = %e, "Trade record lookup failed");
                return;
            }
        };

        let notification = Notification::new(NotificationEvent::PositionClosed {
            user_id: record.user_id,
            ticket: record.ticket,
            symbol: record.symbol.clone(),
            side: record.side.as_str().to_string(),
            lot: record.lot,
            entry_price: record.open_price,
            exit_price: deal.map(|d| d.price),
            profit: deal.map(|d| d.profit),
        });

        if let Err(e) = self.notifier.send(&notification).await {
            warn!(ticket = position.ticket, error = %e, "Exit notification failed");
        }
    }
}

/// 티켓과 일치하는 청산 체결을 찾습니다.
///
/// OUT/OUT_BY 체결을 우선하고, 없으면 일치하는 임의의 체결을
/// 반환합니다.
fn find_closing_deal(deals: &[Deal], ticket: u64) -> Option<Deal> {
    deals
        .iter()
        .find(|d| d.matches_ticket(ticket) && d.entry.is_closing())
        .or_else(|| deals.iter().find(|d| d.matches_ticket(ticket)))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldbot_core::{DealEntry, Side};
    use rust_decimal_macros::dec;

    fn deal(ticket: u64, entry: DealEntry, price: rust_decimal::Decimal) -> Deal {
        Deal {
            ticket: ticket + 1,
            order: ticket,
            position: ticket,
            symbol: "XAUUSD".to_string(),
            side: Side::Sell,
            entry,
            price,
            volume: dec!(0.10),
            profit: dec!(5.0),
            time: Utc::now(),
            comment: String::new(),
        }
    }

    #[test]
    fn test_prefers_closing_deal() {
        let deals = vec![
            deal(100, DealEntry::In, dec!(2000.5)),
            deal(100, DealEntry::Out, dec!(2001.5)),
        ];
        let found = find_closing_deal(&deals, 100).unwrap();
        assert_eq!(found.entry, DealEntry::Out);
        assert_eq!(found.price, dec!(2001.5));
    }

    #[test]
    fn test_falls_back_to_any_match() {
        let deals = vec![deal(100, DealEntry::In, dec!(2000.5))];
        let found = find_closing_deal(&deals, 100).unwrap();
        assert_eq!(found.entry, DealEntry::In);
    }

    #[test]
    fn test_no_match_returns_none() {
        let deals = vec![deal(999, DealEntry::Out, dec!(2001.5))];
        assert!(find_closing_deal(&deals, 100).is_none());
    }
}
