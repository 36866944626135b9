/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Gateway events and the callback interface that receives them.
//!
//! The transport decodes wire messages into the closed [`GatewayEvent`] set.
//! [`dispatch`] routes each event onto one [`EventSink`] method. Every method
//! has a no-op default, so a sink implements only the events it cares about.

use crate::types::{OrderId, OrderStatus, TickField, TickerId};
use rust_decimal::Decimal;

/// Payload of an order-status event.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatusUpdate {
    /// Order the update refers to.
    pub order_id: OrderId,
    /// New status.
    pub status: OrderStatus,
    /// Filled quantity so far.
    pub filled: Decimal,
    /// Quantity still working.
    pub remaining: Decimal,
    /// Average fill price.
    pub avg_fill_price: f64,
    /// Permanent id assigned by the gateway.
    pub perm_id: i64,
    /// Parent order id, zero when none.
    pub parent_id: i64,
    /// Price of the last fill.
    pub last_fill_price: f64,
    /// Client id that placed the order.
    pub client_id: i32,
    /// Reason the order is held, if any.
    pub why_held: String,
}

impl OrderStatusUpdate {
    /// Creates an update with only id and status set.
    #[must_use]
    pub fn new(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            order_id,
            status,
            filled: Decimal::ZERO,
            remaining: Decimal::ZERO,
            avg_fill_price: 0.0,
            perm_id: 0,
            parent_id: 0,
            last_fill_price: 0.0,
            client_id: 0,
            why_held: String::new(),
        }
    }
}

/// Open order reported by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrderSummary {
    /// Order id.
    pub order_id: OrderId,
    /// Instrument symbol.
    pub symbol: String,
    /// `BUY` or `SELL`.
    pub action: String,
    /// Total order quantity.
    pub quantity: Decimal,
    /// Order type code.
    pub order_type: String,
    /// Order state as reported with the order.
    pub status: String,
}

/// Position row of a portfolio update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioPosition {
    /// Instrument symbol.
    pub symbol: String,
    /// Signed position.
    pub position: Decimal,
    /// Mark price.
    pub market_price: f64,
    /// Mark value.
    pub market_value: f64,
    /// Average cost.
    pub average_cost: f64,
    /// Unrealized profit and loss.
    pub unrealized_pnl: f64,
    /// Realized profit and loss.
    pub realized_pnl: f64,
    /// Account name.
    pub account: String,
}

/// Contract description returned by a contract-details request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractSummary {
    /// Gateway contract id.
    pub con_id: i64,
    /// Symbol.
    pub symbol: String,
    /// Security type code.
    pub sec_type: String,
    /// Exchange.
    pub exchange: String,
    /// Currency.
    pub currency: String,
    /// Descriptive name.
    pub long_name: String,
}

/// One fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Order the fill belongs to.
    pub order_id: OrderId,
    /// Execution id.
    pub exec_id: String,
    /// Instrument symbol.
    pub symbol: String,
    /// `BOT` or `SLD`.
    pub side: String,
    /// Filled quantity.
    pub shares: Decimal,
    /// Fill price.
    pub price: f64,
    /// Gateway time of the fill.
    pub time: String,
}

/// One historical bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalBar {
    /// Bar date as sent by the gateway.
    pub date: String,
    /// Open.
    pub open: f64,
    /// High.
    pub high: f64,
    /// Low.
    pub low: f64,
    /// Close.
    pub close: f64,
    /// Volume.
    pub volume: Decimal,
    /// Volume-weighted average price.
    pub wap: f64,
    /// Trade count.
    pub bar_count: i32,
    /// Whether the bar has gaps.
    pub has_gaps: bool,
}

/// One row of a scanner result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerRow {
    /// Rank in the result.
    pub rank: i32,
    /// Gateway contract id.
    pub con_id: i64,
    /// Symbol.
    pub symbol: String,
    /// Distance column.
    pub distance: String,
    /// Benchmark column.
    pub benchmark: String,
    /// Projection column.
    pub projection: String,
    /// Combo legs description.
    pub legs: String,
}

/// Option model values for a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionComputation {
    /// Implied volatility.
    pub implied_vol: f64,
    /// Delta.
    pub delta: f64,
    /// Option price.
    pub option_price: f64,
    /// Present value of dividends.
    pub pv_dividend: f64,
    /// Gamma.
    pub gamma: f64,
    /// Vega.
    pub vega: f64,
    /// Theta.
    pub theta: f64,
    /// Underlying price.
    pub underlying_price: f64,
}

/// A decoded event received from the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Price tick on a market-data subscription.
    TickPrice {
        /// Subscription id.
        ticker_id: TickerId,
        /// Tick field code.
        field: TickField,
        /// Price.
        price: f64,
        /// Whether the price is eligible for automatic execution.
        can_auto_execute: bool,
    },
    /// Size tick on a market-data subscription.
    TickSize {
        /// Subscription id.
        ticker_id: TickerId,
        /// Tick field code.
        field: TickField,
        /// Size.
        size: Decimal,
    },
    /// Option model values on a market-data subscription.
    TickOptionComputation {
        /// Subscription id.
        ticker_id: TickerId,
        /// Tick field code.
        field: TickField,
        /// Model values.
        computation: OptionComputation,
    },
    /// Exchange-for-physical quote.
    TickEfp {
        /// Subscription id.
        ticker_id: TickerId,
        /// Tick field code.
        field: TickField,
        /// Basis in points.
        basis_points: f64,
        /// Basis as displayed.
        formatted_basis_points: String,
        /// Dividends until expiry.
        total_dividends: f64,
        /// Days the position is held.
        hold_days: i32,
        /// Future expiry.
        future_expiry: String,
    },
    /// Generic numeric tick.
    TickGeneric {
        /// Subscription id.
        ticker_id: TickerId,
        /// Tick field code.
        field: TickField,
        /// Value.
        value: f64,
    },
    /// Textual tick.
    TickString {
        /// Subscription id.
        ticker_id: TickerId,
        /// Tick field code.
        field: TickField,
        /// Value.
        value: String,
    },
    /// Order status change.
    OrderStatus(OrderStatusUpdate),
    /// Error or informational notice.
    Error {
        /// Request id, `-1` when not tied to a request.
        id: i64,
        /// Error code.
        code: i32,
        /// Message text.
        message: String,
    },
    /// Next order id the gateway will accept.
    NextValidId(OrderId),
    /// Gateway clock reading, seconds since epoch.
    CurrentTime(i64),
    /// Account value update.
    AccountValue {
        /// Value key.
        key: String,
        /// Value.
        value: String,
        /// Currency of the value.
        currency: String,
        /// Account name.
        account: String,
    },
    /// Account update timestamp.
    AccountTime(String),
    /// End of an account download.
    AccountDownloadEnd(String),
    /// Comma-separated list of managed accounts.
    ManagedAccounts(String),
    /// Level-one book update.
    MarketDepth {
        /// Subscription id.
        ticker_id: TickerId,
        /// Book row.
        position: i32,
        /// Insert, update or delete.
        operation: i32,
        /// Book side.
        side: i32,
        /// Price.
        price: f64,
        /// Size.
        size: Decimal,
    },
    /// Level-two book update.
    MarketDepthL2 {
        /// Subscription id.
        ticker_id: TickerId,
        /// Book row.
        position: i32,
        /// Quoting market maker.
        market_maker: String,
        /// Insert, update or delete.
        operation: i32,
        /// Book side.
        side: i32,
        /// Price.
        price: f64,
        /// Size.
        size: Decimal,
    },
    /// News bulletin.
    NewsBulletin {
        /// Bulletin id.
        msg_id: i32,
        /// Bulletin type.
        msg_type: i32,
        /// Bulletin text.
        message: String,
        /// Originating exchange.
        origin_exchange: String,
    },
    /// Financial-advisor configuration.
    ReceiveFa {
        /// Configuration kind.
        data_type: i32,
        /// XML payload.
        xml: String,
    },
    /// Scanner parameter XML.
    ScannerParameters(String),
    /// Five-second real-time bar.
    RealtimeBar {
        /// Request id.
        req_id: i64,
        /// Bar start, seconds since epoch.
        time: i64,
        /// Open.
        open: f64,
        /// High.
        high: f64,
        /// Low.
        low: f64,
        /// Close.
        close: f64,
        /// Volume.
        volume: Decimal,
        /// Volume-weighted average price.
        wap: f64,
        /// Trade count.
        count: i32,
    },
    /// Fundamental data report.
    FundamentalData {
        /// Request id.
        req_id: i64,
        /// Report payload.
        data: String,
    },
    /// Open order.
    OpenOrder(OpenOrderSummary),
    /// Portfolio position update.
    PortfolioUpdate(PortfolioPosition),
    /// Contract-details row.
    ContractDetails {
        /// Request id.
        req_id: i64,
        /// Contract.
        contract: ContractSummary,
    },
    /// Bond contract-details row.
    BondContractDetails {
        /// Request id.
        req_id: i64,
        /// Contract.
        contract: ContractSummary,
    },
    /// Execution report.
    ExecDetails {
        /// Request id.
        req_id: i64,
        /// Fill.
        execution: Execution,
    },
    /// Historical bars of one request, delivered together.
    HistoricalData {
        /// Request id.
        req_id: i64,
        /// Start of the covered range.
        start: String,
        /// End of the covered range.
        end: String,
        /// Bars in time order.
        bars: Vec<HistoricalBar>,
    },
    /// Scanner result.
    ScannerData {
        /// Request id.
        req_id: i64,
        /// Rows in rank order.
        rows: Vec<ScannerRow>,
    },
    /// Delta-neutral underlying accepted by the gateway.
    DeltaNeutralValidation {
        /// Request id.
        req_id: i64,
        /// Underlying contract id.
        con_id: i64,
        /// Delta.
        delta: f64,
        /// Price.
        price: f64,
    },
    /// End of a contract-details response.
    ContractDetailsEnd(i64),
    /// End of the open-orders list.
    OpenOrderEnd,
    /// End of an execution-details response.
    ExecDetailsEnd(i64),
    /// End of a snapshot subscription.
    TickSnapshotEnd(i64),
    /// Market-data type in effect for a subscription.
    MarketDataType {
        /// Request id.
        req_id: i64,
        /// Data type code.
        data_type: i32,
    },
    /// The gateway closed the connection.
    ConnectionClosed,
    /// A message id the decoder does not know.
    Unhandled {
        /// Raw message id.
        msg_id: i32,
    },
}

/// Callback interface for gateway events.
///
/// Implement this trait to receive decoded events. All methods default to
/// no-ops; the session implements the order, id, time and error callbacks,
/// the tick recorder implements the tick callbacks.
#[allow(unused_variables)]
pub trait EventSink {
    /// Called on a price tick.
    fn on_tick_price(
        &mut self,
        ticker_id: TickerId,
        field: TickField,
        price: f64,
        can_auto_execute: bool,
    ) {
    }

    /// Called on a size tick.
    fn on_tick_size(&mut self, ticker_id: TickerId, field: TickField, size: Decimal) {}

    /// Called with option model values.
    fn on_tick_option_computation(
        &mut self,
        ticker_id: TickerId,
        field: TickField,
        computation: &OptionComputation,
    ) {
    }

    /// Called on an exchange-for-physical quote.
    #[allow(clippy::too_many_arguments)]
    fn on_tick_efp(
        &mut self,
        ticker_id: TickerId,
        field: TickField,
        basis_points: f64,
        formatted_basis_points: &str,
        total_dividends: f64,
        hold_days: i32,
        future_expiry: &str,
    ) {
    }

    /// Called on a generic tick.
    fn on_tick_generic(&mut self, ticker_id: TickerId, field: TickField, value: f64) {}

    /// Called on a string tick.
    fn on_tick_string(&mut self, ticker_id: TickerId, field: TickField, value: &str) {}

    /// Called when an order changes status.
    fn on_order_status(&mut self, update: &OrderStatusUpdate) {}

    /// Called when the gateway assigns the next valid order id.
    fn on_next_valid_id(&mut self, order_id: OrderId) {}

    /// Called with the gateway's clock reading.
    fn on_current_time(&mut self, epoch_secs: i64) {}

    /// Called on an error or notice.
    fn on_error(&mut self, id: i64, code: i32, message: &str) {}

    /// Called on an account value update.
    fn on_account_value(&mut self, key: &str, value: &str, currency: &str, account: &str) {}

    /// Called on an account time update.
    fn on_account_time(&mut self, timestamp: &str) {}

    /// Called at the end of an account download.
    fn on_account_download_end(&mut self, account: &str) {}

    /// Called with the managed accounts list.
    fn on_managed_accounts(&mut self, accounts: &str) {}

    /// Called on a level-one book update.
    fn on_market_depth(
        &mut self,
        ticker_id: TickerId,
        position: i32,
        operation: i32,
        side: i32,
        price: f64,
        size: Decimal,
    ) {
    }

    /// Called on a level-two book update.
    #[allow(clippy::too_many_arguments)]
    fn on_market_depth_l2(
        &mut self,
        ticker_id: TickerId,
        position: i32,
        market_maker: &str,
        operation: i32,
        side: i32,
        price: f64,
        size: Decimal,
    ) {
    }

    /// Called on a news bulletin.
    fn on_news_bulletin(&mut self, msg_id: i32, msg_type: i32, message: &str, origin: &str) {}

    /// Called with financial-advisor configuration.
    fn on_receive_fa(&mut self, data_type: i32, xml: &str) {}

    /// Called with scanner parameter XML.
    fn on_scanner_parameters(&mut self, xml: &str) {}

    /// Called on a real-time bar.
    #[allow(clippy::too_many_arguments)]
    fn on_realtime_bar(
        &mut self,
        req_id: i64,
        time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Decimal,
        wap: f64,
        count: i32,
    ) {
    }

    /// Called with a fundamental data report.
    fn on_fundamental_data(&mut self, req_id: i64, data: &str) {}

    /// Called for each open order.
    fn on_open_order(&mut self, order: &OpenOrderSummary) {}

    /// Called on a portfolio position update.
    fn on_portfolio_update(&mut self, position: &PortfolioPosition) {}

    /// Called for each contract-details row.
    fn on_contract_details(&mut self, req_id: i64, contract: &ContractSummary) {}

    /// Called for each bond contract-details row.
    fn on_bond_contract_details(&mut self, req_id: i64, contract: &ContractSummary) {}

    /// Called for each execution report.
    fn on_exec_details(&mut self, req_id: i64, execution: &Execution) {}

    /// Called for each historical bar.
    fn on_historical_data(&mut self, req_id: i64, bar: &HistoricalBar) {}

    /// Called after the last bar of a historical-data response.
    fn on_historical_data_end(&mut self, req_id: i64, start: &str, end: &str) {}

    /// Called for each scanner row.
    fn on_scanner_data(&mut self, req_id: i64, row: &ScannerRow) {}

    /// Called after the last row of a scanner result.
    fn on_scanner_data_end(&mut self, req_id: i64) {}

    /// Called when the gateway accepts a delta-neutral underlying.
    fn on_delta_neutral_validation(&mut self, req_id: i64, con_id: i64, delta: f64, price: f64) {}

    /// Called at the end of a contract-details response.
    fn on_contract_details_end(&mut self, req_id: i64) {}

    /// Called at the end of the open-orders list.
    fn on_open_order_end(&mut self) {}

    /// Called at the end of an execution-details response.
    fn on_exec_details_end(&mut self, req_id: i64) {}

    /// Called at the end of a snapshot subscription.
    fn on_tick_snapshot_end(&mut self, req_id: i64) {}

    /// Called with the market-data type of a subscription.
    fn on_market_data_type(&mut self, req_id: i64, data_type: i32) {}

    /// Called when the gateway closes the connection.
    fn on_connection_closed(&mut self) {}

    /// Called for message ids the decoder does not know.
    fn on_unhandled(&mut self, msg_id: i32) {}
}

/// Sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl EventSink for NoOpSink {}

/// Routes one event onto the matching [`EventSink`] method.
pub fn dispatch<S: EventSink + ?Sized>(sink: &mut S, event: &GatewayEvent) {
    match event {
        GatewayEvent::TickPrice {
            ticker_id,
            field,
            price,
            can_auto_execute,
        } => sink.on_tick_price(*ticker_id, *field, *price, *can_auto_execute),
        GatewayEvent::TickSize {
            ticker_id,
            field,
            size,
        } => sink.on_tick_size(*ticker_id, *field, *size),
        GatewayEvent::TickOptionComputation {
            ticker_id,
            field,
            computation,
        } => sink.on_tick_option_computation(*ticker_id, *field, computation),
        GatewayEvent::TickEfp {
            ticker_id,
            field,
            basis_points,
            formatted_basis_points,
            total_dividends,
            hold_days,
            future_expiry,
        } => sink.on_tick_efp(
            *ticker_id,
            *field,
            *basis_points,
            formatted_basis_points,
            *total_dividends,
            *hold_days,
            future_expiry,
        ),
        GatewayEvent::TickGeneric {
            ticker_id,
            field,
            value,
        } => sink.on_tick_generic(*ticker_id, *field, *value),
        GatewayEvent::TickString {
            ticker_id,
            field,
            value,
        } => sink.on_tick_string(*ticker_id, *field, value),
        GatewayEvent::OrderStatus(update) => sink.on_order_status(update),
        GatewayEvent::Error { id, code, message } => sink.on_error(*id, *code, message),
        GatewayEvent::NextValidId(order_id) => sink.on_next_valid_id(*order_id),
        GatewayEvent::CurrentTime(secs) => sink.on_current_time(*secs),
        GatewayEvent::AccountValue {
            key,
            value,
            currency,
            account,
        } => sink.on_account_value(key, value, currency, account),
        GatewayEvent::AccountTime(timestamp) => sink.on_account_time(timestamp),
        GatewayEvent::AccountDownloadEnd(account) => sink.on_account_download_end(account),
        GatewayEvent::ManagedAccounts(accounts) => sink.on_managed_accounts(accounts),
        GatewayEvent::MarketDepth {
            ticker_id,
            position,
            operation,
            side,
            price,
            size,
        } => sink.on_market_depth(*ticker_id, *position, *operation, *side, *price, *size),
        GatewayEvent::MarketDepthL2 {
            ticker_id,
            position,
            market_maker,
            operation,
            side,
            price,
            size,
        } => sink.on_market_depth_l2(
            *ticker_id,
            *position,
            market_maker,
            *operation,
            *side,
            *price,
            *size,
        ),
        GatewayEvent::NewsBulletin {
            msg_id,
            msg_type,
            message,
            origin_exchange,
        } => sink.on_news_bulletin(*msg_id, *msg_type, message, origin_exchange),
        GatewayEvent::ReceiveFa { data_type, xml } => sink.on_receive_fa(*data_type, xml),
        GatewayEvent::ScannerParameters(xml) => sink.on_scanner_parameters(xml),
        GatewayEvent::RealtimeBar {
            req_id,
            time,
            open,
            high,
            low,
            close,
            volume,
            wap,
            count,
        } => sink.on_realtime_bar(
            *req_id, *time, *open, *high, *low, *close, *volume, *wap, *count,
        ),
        GatewayEvent::FundamentalData { req_id, data } => sink.on_fundamental_data(*req_id, data),
        GatewayEvent::OpenOrder(order) => sink.on_open_order(order),
        GatewayEvent::PortfolioUpdate(position) => sink.on_portfolio_update(position),
        GatewayEvent::ContractDetails { req_id, contract } => {
            sink.on_contract_details(*req_id, contract)
        }
        GatewayEvent::BondContractDetails { req_id, contract } => {
            sink.on_bond_contract_details(*req_id, contract)
        }
        GatewayEvent::ExecDetails { req_id, execution } => sink.on_exec_details(*req_id, execution),
        GatewayEvent::HistoricalData {
            req_id,
            start,
            end,
            bars,
        } => {
            for bar in bars {
                sink.on_historical_data(*req_id, bar);
            }
            sink.on_historical_data_end(*req_id, start, end);
        }
        GatewayEvent::ScannerData { req_id, rows } => {
            for row in rows {
                sink.on_scanner_data(*req_id, row);
            }
            sink.on_scanner_data_end(*req_id);
        }
        GatewayEvent::DeltaNeutralValidation {
            req_id,
            con_id,
            delta,
            price,
        } => sink.on_delta_neutral_validation(*req_id, *con_id, *delta, *price),
        GatewayEvent::ContractDetailsEnd(req_id) => sink.on_contract_details_end(*req_id),
        GatewayEvent::OpenOrderEnd => sink.on_open_order_end(),
        GatewayEvent::ExecDetailsEnd(req_id) => sink.on_exec_details_end(*req_id),
        GatewayEvent::TickSnapshotEnd(req_id) => sink.on_tick_snapshot_end(*req_id),
        GatewayEvent::MarketDataType { req_id, data_type } => {
            sink.on_market_data_type(*req_id, *data_type)
        }
        GatewayEvent::ConnectionClosed => sink.on_connection_closed(),
        GatewayEvent::Unhandled { msg_id } => sink.on_unhandled(*msg_id),
    }
}
