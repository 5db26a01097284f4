//! 주문 디스패처.
//!
//! 사이징된 주문 의도를 게이트웨이에 제출하고, 성공 시에만 일일
//! 카운터 증가, 추적 등록, OPEN 레코드 영속화, 진입 알림을
//! 수행합니다. 제출 실패 시 아무 상태도 변경하지 않습니다.

use std::sync::Arc;

use chrono::Utc;
use goldbot_core::{
    EngineError, EngineResult, OrderIntent, OrderTicket, TradeRecord, TradeStatus,
    TrackedPosition, UserTradingSettings,
};
use goldbot_data::TradeStore;
use goldbot_gateway::MarketDataGateway;
use goldbot_notification::{Notification, NotificationEvent, NotificationSender};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::daily_limit::DailyTradeCounter;
use crate::tracker::PositionTracker;

/// 주문 디스패처.
pub struct OrderDispatcher {
    gateway: Arc<dyn MarketDataGateway>,
    trades: Arc<dyn TradeStore>,
    notifier: Arc<dyn NotificationSender>,
    tracker: Arc<PositionTracker>,
    counter: Mutex<DailyTradeCounter>,
    /// 프로세스 전역 일일 거래 상한
    global_limit: u32,
}

impl OrderDispatcher {
    /// 새 디스패처를 생성합니다.
    pub fn new(
        gateway: Arc<dyn MarketDataGateway>,
        trades: Arc<dyn TradeStore>,
        notifier: Arc<dyn NotificationSender>,
        tracker: Arc<PositionTracker>,
        global_limit: u32,
    ) -> Self {
        Self {
            gateway,
            trades,
            notifier,
            tracker,
            counter: Mutex::new(DailyTradeCounter::new(Utc::now().date_naive())),
            global_limit,
        }
    }

    /// 오늘 접수된 거래 수를 반환합니다.
    pub async fn trades_today(&self) -> u32 {
        let mut counter = self.counter.lock().await;
        counter.reset_if_new_day(Utc::now().date_naive());
        counter.count()
    }

    /// 주문 의도를 제출합니다.
    ///
    /// 전역 상한과 사용자별 `max_daily_trades`를 모두 확인합니다.
    /// 성공 시 카운터 증가, 추적 등록, OPEN 레코드 영속화, 진입 알림
    /// 순으로 진행합니다. 영속화 실패는 운영자 경보 후 계속 진행하고
    /// (주문은 이미 살아 있음), 알림 실패는 기록만 하고 무시합니다.
    pub async fn dispatch(
        &self,
        user_id: i64,
        settings: &UserTradingSettings,
        intent: &OrderIntent,
    ) -> EngineResult<OrderTicket> {
        {
            let mut counter = self.counter.lock().await;
            counter.reset_if_new_day(Utc::now().date_naive());
            if counter.is_exhausted(self.global_limit) {
                return Err(EngineError::RiskRejected(format!(
                    "전역 일일 거래 한도 도달 ({})",
                    self.global_limit
                )));
            }
            if counter.is_exhausted(settings.max_daily_trades) {
                let first_rejection = counter.mark_limit_notified(user_id);
                drop(counter);
                if first_rejection {
                    // 한도 도달 알림은 하루 한 번만 보낸다
                    let notification =
                        Notification::new(NotificationEvent::DailyLimitReached {
                            user_id,
                            limit: settings.max_daily_trades,
                        });
                    if let Err(e) = self.notifier.send(&notification).await {
                        warn!(user_id, error = %e, "Daily limit notification failed");
                    }
                }
                return Err(EngineError::RiskRejected(format!(
                    "사용자 일일 거래 한도 도달 ({})",
                    settings.max_daily_trades
                )));
            }
        }

        let ticket = match self.gateway.place_order(intent).await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                let err = EngineError::SubmissionFailed(format!(
                    "{} {} 주문 접수 결과 없음",
                    intent.symbol,
                    intent.side.as_str()
                ));
                self.alert_operator("dispatcher", &err.to_string()).await;
                return Err(err);
            }
            Err(e) => {
                let err = EngineError::SubmissionFailed(e.to_string());
                self.alert_operator("dispatcher", &err.to_string()).await;
                return Err(err);
            }
        };

        info!(
            user_id,
            ticket = ticket.ticket,
            side = %intent.side,
            lot = %ticket.volume,
            price = %ticket.price,
            "Order accepted"
        );

        {
            let mut counter = self.counter.lock().await;
            counter.reset_if_new_day(Utc::now().date_naive());
            counter.record();
        }

        self.tracker
            .track(TrackedPosition::new(user_id, ticket.ticket, ticket.time))
            .await;

        let record = TradeRecord {
            user_id,
            ticket: ticket.ticket,
            symbol: intent.symbol.clone(),
            side: intent.side,
            lot: ticket.volume,
            open_price: ticket.price,
            close_price: None,
            stop_loss: Some(intent.stop_loss),
            take_profit: Some(intent.take_profit),
            profit: None,
            status: TradeStatus::Open,
            open_time: ticket.time,
            close_time: None,
            comment: intent.comment.clone(),
        };
        if let Err(e) = self.trades.insert_open(&record).await {
            // 주문은 이미 살아 있으므로 메모리 상태는 유지한다
            error!(ticket = ticket.ticket, error = %e, "Failed to persist open trade");
            self.alert_operator("dispatcher", &format!("영속화 실패: {}", e))
                .await;
        }

        let notification = Notification::new(NotificationEvent::PositionOpened {
            user_id,
            ticket: ticket.ticket,
            symbol: intent.symbol.clone(),
            side: intent.side.as_str().to_string(),
            lot: ticket.volume,
            entry_price: ticket.price,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
        });
        if let Err(e) = self.notifier.send(&notification).await {
            warn!(ticket = ticket.ticket, error = %e, "Entry notification failed");
        }

        Ok(ticket)
    }

    /// 운영자 채널로 시스템 오류를 보고합니다. 전송 실패는 무시합니다.
    async fn alert_operator(&self, component: &str, message: &str) {
        let notification = Notification::new(NotificationEvent::SystemError {
            component: component.to_string(),
            message: message.to_string(),
        });
        if let Err(e) = self.notifier.send(&notification).await {
            warn!(error = %e, "Operator alert failed");
        }
    }
}
