use crate::domain::entities::price_series::PriceSeries;
use chrono::NaiveDate;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    OnBalanceVolume, RelativeStrengthIndex, SimpleMovingAverage, SlowStochastic,
};
use ta::{Close, DataItem, High, Low, Next};

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BB_PERIOD: usize = 5;
const BB_STDDEV: f64 = 2.0;
const STOCH_PERIOD: usize = 5;
const STOCH_SMOOTHING: usize = 3;
const ADX_PERIOD: usize = 14;
const AROON_PERIOD: usize = 14;

/// Feeds every input through `indicator` and keeps the final output.
fn run<I, T>(mut indicator: I, inputs: impl IntoIterator<Item = T>) -> Option<I::Output>
where
    I: Next<T>,
{
    inputs.into_iter().map(|input| indicator.next(input)).last()
}

/// Complete bars on or before `until` as `ta` data items. Bars `ta` rejects
/// (e.g. a close outside the high/low range) are skipped.
fn data_items(series: &PriceSeries, until: NaiveDate) -> Vec<DataItem> {
    series
        .bars_until(until)
        .filter_map(|(_, bar)| {
            DataItem::builder()
                .open(bar.open?)
                .high(bar.high?)
                .low(bar.low?)
                .close(bar.close?)
                .volume(bar.volume?)
                .build()
                .ok()
        })
        .collect()
}

fn sma(series: &PriceSeries, date: NaiveDate, period: usize) -> Option<f64> {
    let closes = series.closes_until(date);
    if closes.len() < period {
        return None;
    }
    run(SimpleMovingAverage::new(period).ok()?, closes)
}

fn ema(series: &PriceSeries, date: NaiveDate, period: usize) -> Option<f64> {
    let closes = series.closes_until(date);
    if closes.len() < period {
        return None;
    }
    run(ExponentialMovingAverage::new(period).ok()?, closes)
}

pub fn sma50(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    sma(series, date, 50)
}

pub fn sma200(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    sma(series, date, 200)
}

pub fn ema50(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    ema(series, date, 50)
}

pub fn ema200(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    ema(series, date, 200)
}

pub fn rsi(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    let closes = series.closes_until(date);
    if closes.len() <= RSI_PERIOD {
        return None;
    }
    run(RelativeStrengthIndex::new(RSI_PERIOD).ok()?, closes)
}

fn macd_output(
    series: &PriceSeries,
    date: NaiveDate,
) -> Option<ta::indicators::MovingAverageConvergenceDivergenceOutput> {
    let closes = series.closes_until(date);
    if closes.len() < MACD_SLOW + MACD_SIGNAL - 1 {
        return None;
    }
    let indicator = MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL).ok()?;
    run(indicator, closes)
}

pub fn macd(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    macd_output(series, date).map(|o| o.macd)
}

pub fn macd_signal(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    macd_output(series, date).map(|o| o.signal)
}

pub fn macd_hist(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    macd_output(series, date).map(|o| o.histogram)
}

fn bollinger(
    series: &PriceSeries,
    date: NaiveDate,
) -> Option<ta::indicators::BollingerBandsOutput> {
    let closes = series.closes_until(date);
    if closes.len() < BB_PERIOD {
        return None;
    }
    run(BollingerBands::new(BB_PERIOD, BB_STDDEV).ok()?, closes)
}

pub fn bb_upper(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    bollinger(series, date).map(|o| o.upper)
}

pub fn bb_middle(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    bollinger(series, date).map(|o| o.average)
}

pub fn bb_lower(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    bollinger(series, date).map(|o| o.lower)
}

/// Slow %K for every complete bar, oldest first.
fn slow_k_values(series: &PriceSeries, date: NaiveDate) -> Option<Vec<f64>> {
    let items = data_items(series, date);
    let mut stochastic = SlowStochastic::new(STOCH_PERIOD, STOCH_SMOOTHING).ok()?;
    Some(items.iter().map(|item| stochastic.next(item)).collect())
}

pub fn slow_k(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    let values = slow_k_values(series, date)?;
    if values.len() < STOCH_PERIOD + STOCH_SMOOTHING - 1 {
        return None;
    }
    values.last().copied()
}

/// Simple average of the last three slow %K values.
pub fn slow_d(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    let values = slow_k_values(series, date)?;
    if values.len() < STOCH_PERIOD + 2 * STOCH_SMOOTHING - 2 {
        return None;
    }
    run(SimpleMovingAverage::new(STOCH_SMOOTHING).ok()?, values)
}

pub fn obv(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    let items = data_items(series, date);
    run(OnBalanceVolume::new(), items.iter())
}

/// Average directional index with Wilder smoothing.
pub fn adx(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    let items = data_items(series, date);
    if items.len() < 2 * ADX_PERIOD {
        return None;
    }
    let period = ADX_PERIOD as f64;

    let mut tr = Vec::with_capacity(items.len() - 1);
    let mut plus_dm = Vec::with_capacity(items.len() - 1);
    let mut minus_dm = Vec::with_capacity(items.len() - 1);
    for pair in items.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let up = cur.high() - prev.high();
        let down = prev.low() - cur.low();
        tr.push(
            (cur.high() - cur.low())
                .max((cur.high() - prev.close()).abs())
                .max((cur.low() - prev.close()).abs()),
        );
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let mut tr_s: f64 = tr[..ADX_PERIOD].iter().sum();
    let mut plus_s: f64 = plus_dm[..ADX_PERIOD].iter().sum();
    let mut minus_s: f64 = minus_dm[..ADX_PERIOD].iter().sum();
    let dx = |tr_s: f64, plus_s: f64, minus_s: f64| {
        if tr_s == 0.0 {
            return 0.0;
        }
        let plus_di = 100.0 * plus_s / tr_s;
        let minus_di = 100.0 * minus_s / tr_s;
        let sum = plus_di + minus_di;
        if sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / sum
        }
    };

    let mut dxs = vec![dx(tr_s, plus_s, minus_s)];
    for i in ADX_PERIOD..tr.len() {
        tr_s = tr_s - tr_s / period + tr[i];
        plus_s = plus_s - plus_s / period + plus_dm[i];
        minus_s = minus_s - minus_s / period + minus_dm[i];
        dxs.push(dx(tr_s, plus_s, minus_s));
    }

    let mut adx: f64 = dxs[..ADX_PERIOD].iter().sum::<f64>() / period;
    for value in &dxs[ADX_PERIOD..] {
        adx = (adx * (period - 1.0) + value) / period;
    }
    Some(adx)
}

/// Aroon up minus Aroon down over the last `AROON_PERIOD + 1` bars. Ties
/// resolve to the most recent extreme.
pub fn aroon_oscillator(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
    let items = data_items(series, date);
    if items.len() <= AROON_PERIOD {
        return None;
    }
    let window = &items[items.len() - AROON_PERIOD - 1..];

    let mut highest = 0;
    let mut lowest = 0;
    for (i, item) in window.iter().enumerate() {
        if item.high() >= window[highest].high() {
            highest = i;
        }
        if item.low() <= window[lowest].low() {
            lowest = i;
        }
    }
    let period = AROON_PERIOD as f64;
    let up = 100.0 * highest as f64 / period;
    let down = 100.0 * lowest as f64 / period;
    Some(up - down)
}
