// In crates/backtester/src/alerts.rs

use chrono::{Days, Local, NaiveDate};
use core_types::{AlertAction, DailyAlert, StockId};

/// Decides which transitions become daily alerts.
///
/// Only a transition on the bar dated the day before `today` is alerted. The
/// alert itself is stamped with `today`, the day it is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWindow {
    today: NaiveDate,
}

impl AlertWindow {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn from_wall_clock() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The only bar date whose transitions are alerted.
    pub fn alert_bar_date(&self) -> Option<NaiveDate> {
        self.today.checked_sub_days(Days::new(1))
    }

    pub fn alert_for(
        &self,
        stock_id: &StockId,
        bar_date: NaiveDate,
        action: AlertAction,
    ) -> Option<DailyAlert> {
        (self.alert_bar_date() == Some(bar_date)).then(|| DailyAlert {
            date: self.today,
            stock_id: stock_id.clone(),
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yesterdays_bar_is_alerted() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = AlertWindow::new(today);
        let stock = StockId::from("SQURPHARMA");

        let yesterday = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let alert = window.alert_for(&stock, yesterday, AlertAction::Buy).unwrap();
        assert_eq!(alert.date, today);
        assert_eq!(alert.action, AlertAction::Buy);

        assert!(window.alert_for(&stock, today, AlertAction::Buy).is_none());
        let two_days_ago = yesterday.pred_opt().unwrap();
        assert!(window.alert_for(&stock, two_days_ago, AlertAction::Sell).is_none());
    }
}
