//! 일일 거래 카운터.
//!
//! 프로세스 전역으로 하루에 접수된 거래 수를 추적합니다. 날짜는
//! UTC 기준이며, 자정을 넘기면 다음 확인 시점에 0으로 재설정됩니다.
//! 카운터는 디스패처만 증가시킵니다.

use chrono::NaiveDate;
use std::collections::HashSet;

/// 일일 거래 카운터.
#[derive(Debug, Clone)]
pub struct DailyTradeCounter {
    date: NaiveDate,
    count: u32,
    /// 오늘 한도 도달 알림을 이미 받은 사용자
    limit_notified: HashSet<i64>,
}

impl DailyTradeCounter {
    /// 오늘 날짜로 초기화된 카운터를 생성합니다.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
            limit_notified: HashSet::new(),
        }
    }

    /// 날짜가 바뀌었으면 카운터를 재설정합니다.
    ///
    /// 한도 확인 전에 반드시 호출해야 합니다.
    pub fn reset_if_new_day(&mut self, today: NaiveDate) {
        if today != self.date {
            self.date = today;
            self.count = 0;
            self.limit_notified.clear();
        }
    }

    /// 한도 도달 알림 대상자로 기록합니다.
    ///
    /// 오늘 처음 기록되는 사용자면 true를 반환합니다 (하루 한 번만 알림).
    pub fn mark_limit_notified(&mut self, user_id: i64) -> bool {
        self.limit_notified.insert(user_id)
    }

    /// 오늘 접수된 거래 수를 반환합니다.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// 한도에 도달했는지 확인합니다.
    pub fn is_exhausted(&self, limit: u32) -> bool {
        self.count >= limit
    }

    /// 접수된 거래를 기록합니다.
    pub fn record(&mut self) {
        self.count += 1;
    }
}
