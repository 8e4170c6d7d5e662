use rigctl_core::{ExchangeRateSource, StateEvent};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::notify::NotificationBus;

/// 余额控制器，法币金额读取时计算，不缓存
pub struct BalanceController {
    balance: Mutex<f64>,
    rates: Arc<dyn ExchangeRateSource>,
    bus: Arc<NotificationBus>,
}

impl BalanceController {
    pub fn new(rates: Arc<dyn ExchangeRateSource>, bus: Arc<NotificationBus>) -> Self {
        Self {
            balance: Mutex::new(0.0),
            rates,
            bus,
        }
    }

    fn lock_balance(&self) -> MutexGuard<'_, f64> {
        match self.balance.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// BTC 余额
    pub fn balance(&self) -> f64 {
        *self.lock_balance()
    }

    /// 按当前汇率换算的 (金额, 货币符号)
    pub fn fiat_balance(&self) -> (f64, String) {
        let usd = self.balance() * self.rates.usd_exchange_rate();
        (
            self.rates.convert_to_active_currency(usd),
            self.rates.active_display_currency(),
        )
    }

    /// 每次上报都发布两条通知，不做变化检测
    pub fn on_balance_reported(&self, btc: f64) {
        *self.lock_balance() = btc;
        debug!("Balance reported: {} BTC", btc);
        self.bus.publish(StateEvent::BalanceUpdated { btc });

        let (amount, symbol) = self.fiat_balance();
        self.bus.publish(StateEvent::FiatBalanceUpdated { amount, symbol });
    }
}
