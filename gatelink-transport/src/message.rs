/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Gateway message encoding and decoding.
//!
//! A frame payload is a list of NUL-terminated ASCII fields. The first field
//! is the message id and the second the message version. [`FieldWriter`]
//! builds outgoing payloads, [`FieldReader`] walks incoming ones without
//! copying, and [`decode_event`] maps a payload onto a [`GatewayEvent`].

use bytes::{BufMut, BytesMut};
use gatelink_core::error::DecodeError;
use gatelink_core::event::{
    ContractSummary, Execution, GatewayEvent, HistoricalBar, OpenOrderSummary,
    OptionComputation, OrderStatusUpdate, PortfolioPosition, ScannerRow,
};
use gatelink_core::types::{Instrument, OrderId, OrderIntent, OrderStatus, TickField, TickerId};
use memchr::memchr;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Field terminator.
pub const NUL: u8 = 0x00;

/// Prefix written before the version-range frame of the handshake.
pub const API_PREFIX: &[u8] = b"API\0";

/// Lowest protocol version this client speaks.
pub const MIN_CLIENT_VERSION: i32 = 100;

/// Highest protocol version this client speaks.
pub const MAX_CLIENT_VERSION: i32 = 151;

/// Outgoing message ids.
pub mod outgoing {
    /// Subscribe to market data.
    pub const REQ_MKT_DATA: i32 = 1;
    /// Place an order.
    pub const PLACE_ORDER: i32 = 3;
    /// Cancel an order.
    pub const CANCEL_ORDER: i32 = 4;
    /// Ask for the gateway clock.
    pub const REQ_CURRENT_TIME: i32 = 49;
    /// Start the API session after the handshake.
    pub const START_API: i32 = 71;
}

/// Incoming message ids.
pub mod incoming {
    /// Price tick.
    pub const TICK_PRICE: i32 = 1;
    /// Size tick.
    pub const TICK_SIZE: i32 = 2;
    /// Order status.
    pub const ORDER_STATUS: i32 = 3;
    /// Error or notice.
    pub const ERR_MSG: i32 = 4;
    /// Open order.
    pub const OPEN_ORDER: i32 = 5;
    /// Account value.
    pub const ACCT_VALUE: i32 = 6;
    /// Portfolio position.
    pub const PORTFOLIO_VALUE: i32 = 7;
    /// Account update time.
    pub const ACCT_UPDATE_TIME: i32 = 8;
    /// Next valid order id.
    pub const NEXT_VALID_ID: i32 = 9;
    /// Contract details row.
    pub const CONTRACT_DATA: i32 = 10;
    /// Execution report.
    pub const EXECUTION_DATA: i32 = 11;
    /// Level-one book update.
    pub const MARKET_DEPTH: i32 = 12;
    /// Level-two book update.
    pub const MARKET_DEPTH_L2: i32 = 13;
    /// News bulletin.
    pub const NEWS_BULLETINS: i32 = 14;
    /// Managed accounts.
    pub const MANAGED_ACCTS: i32 = 15;
    /// Financial-advisor configuration.
    pub const RECEIVE_FA: i32 = 16;
    /// Historical bars.
    pub const HISTORICAL_DATA: i32 = 17;
    /// Bond contract details row.
    pub const BOND_CONTRACT_DATA: i32 = 18;
    /// Scanner parameters.
    pub const SCANNER_PARAMETERS: i32 = 19;
    /// Scanner result.
    pub const SCANNER_DATA: i32 = 20;
    /// Option model tick.
    pub const TICK_OPTION_COMPUTATION: i32 = 21;
    /// Generic tick.
    pub const TICK_GENERIC: i32 = 45;
    /// String tick.
    pub const TICK_STRING: i32 = 46;
    /// Exchange-for-physical tick.
    pub const TICK_EFP: i32 = 47;
    /// Gateway clock.
    pub const CURRENT_TIME: i32 = 49;
    /// Real-time bar.
    pub const REAL_TIME_BARS: i32 = 50;
    /// Fundamental data.
    pub const FUNDAMENTAL_DATA: i32 = 51;
    /// Contract details end.
    pub const CONTRACT_DATA_END: i32 = 52;
    /// Open orders end.
    pub const OPEN_ORDER_END: i32 = 53;
    /// Account download end.
    pub const ACCT_DOWNLOAD_END: i32 = 54;
    /// Execution details end.
    pub const EXECUTION_DATA_END: i32 = 55;
    /// Delta-neutral validation.
    pub const DELTA_NEUTRAL_VALIDATION: i32 = 56;
    /// Snapshot end.
    pub const TICK_SNAPSHOT_END: i32 = 57;
    /// Market-data type.
    pub const MARKET_DATA_TYPE: i32 = 58;
}

/// Builder for an outgoing payload.
#[derive(Debug)]
pub struct FieldWriter {
    /// Encoded fields.
    buf: BytesMut,
}

impl FieldWriter {
    /// Creates a payload starting with the message id and version.
    #[must_use]
    pub fn new(msg_id: i32, version: i32) -> Self {
        let mut writer = Self {
            buf: BytesMut::with_capacity(128),
        };
        writer.put_int(i64::from(msg_id));
        writer.put_int(i64::from(version));
        writer
    }

    /// Appends a string field.
    #[inline]
    pub fn put_str(&mut self, value: &str) {
        self.buf.put_slice(value.as_bytes());
        self.buf.put_u8(NUL);
    }

    /// Appends an integer field.
    #[inline]
    pub fn put_int(&mut self, value: i64) {
        let mut buf = itoa::Buffer::new();
        self.put_str(buf.format(value));
    }

    /// Appends a boolean field as `1`/`0`.
    #[inline]
    pub fn put_bool(&mut self, value: bool) {
        self.put_str(if value { "1" } else { "0" });
    }

    /// Appends a decimal field, empty when absent.
    #[inline]
    pub fn put_decimal(&mut self, value: Option<Decimal>) {
        match value {
            Some(value) => self.put_str(&value.normalize().to_string()),
            None => self.put_str(""),
        }
    }

    /// Appends the instrument block shared by market-data and order requests.
    fn put_instrument(&mut self, instrument: &Instrument) {
        self.put_int(0); // contract id, resolved by the gateway
        self.put_str(&instrument.symbol);
        self.put_str(instrument.sec_type.as_str());
        self.put_str(""); // last trade date
        self.put_str("0"); // strike
        self.put_str(""); // right
        self.put_str(""); // multiplier
        self.put_str(&instrument.exchange);
        self.put_str(""); // primary exchange
        self.put_str(&instrument.currency);
        self.put_str(""); // local symbol
        self.put_str(""); // trading class
    }

    /// Returns the current payload length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finalizes the payload.
    #[must_use]
    pub fn finish(self) -> BytesMut {
        self.buf
    }
}

/// Encodes the version-range payload sent right after [`API_PREFIX`].
#[must_use]
pub fn encode_version_range() -> BytesMut {
    BytesMut::from(format!("v{MIN_CLIENT_VERSION}..{MAX_CLIENT_VERSION}").as_bytes())
}

/// Encodes the START_API request.
#[must_use]
pub fn encode_start_api(client_id: i32) -> BytesMut {
    let mut w = FieldWriter::new(outgoing::START_API, 2);
    w.put_int(i64::from(client_id));
    w.put_str(""); // optional capabilities
    w.finish()
}

/// Encodes a market-data subscription.
#[must_use]
pub fn encode_request_market_data(
    ticker_id: TickerId,
    instrument: &Instrument,
    snapshot: bool,
) -> BytesMut {
    let mut w = FieldWriter::new(outgoing::REQ_MKT_DATA, 11);
    w.put_int(ticker_id.value());
    w.put_instrument(instrument);
    w.put_bool(false); // delta-neutral contract
    w.put_str(""); // generic tick list
    w.put_bool(snapshot);
    w.put_bool(false); // regulatory snapshot
    w.put_str(""); // market data options
    w.finish()
}

/// Encodes a current-time request.
#[must_use]
pub fn encode_request_current_time() -> BytesMut {
    FieldWriter::new(outgoing::REQ_CURRENT_TIME, 1).finish()
}

/// Encodes an order placement.
#[must_use]
pub fn encode_place_order(order_id: OrderId, intent: &OrderIntent) -> BytesMut {
    let mut w = FieldWriter::new(outgoing::PLACE_ORDER, 45);
    w.put_int(order_id.value());
    w.put_instrument(&intent.instrument);
    w.put_str(intent.side.as_str());
    w.put_decimal(Some(intent.quantity));
    w.put_str(intent.order_type.as_str());
    w.put_decimal(intent.limit_price);
    w.put_str(""); // aux price
    w.put_str("DAY");
    w.put_bool(true); // transmit
    w.finish()
}

/// Encodes an order cancel.
#[must_use]
pub fn encode_cancel_order(order_id: OrderId) -> BytesMut {
    let mut w = FieldWriter::new(outgoing::CANCEL_ORDER, 1);
    w.put_int(order_id.value());
    w.finish()
}

/// Zero-copy reader over the fields of one payload.
#[derive(Debug)]
pub struct FieldReader<'a> {
    /// Payload bytes.
    input: &'a [u8],
    /// Current byte offset.
    offset: usize,
    /// Index of the next field.
    index: usize,
    /// Message id, for error reporting.
    msg_id: i32,
}

impl<'a> FieldReader<'a> {
    /// Creates a reader over a payload.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            index: 0,
            msg_id: 0,
        }
    }

    /// Returns the raw bytes of the next field.
    pub fn next_field(&mut self) -> Option<&'a [u8]> {
        if self.offset >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.offset..];
        let field = match memchr(NUL, rest) {
            Some(end) => {
                self.offset += end + 1;
                &rest[..end]
            }
            None => {
                self.offset = self.input.len();
                rest
            }
        };
        self.index += 1;
        Some(field)
    }

    /// Reads the next field as text.
    ///
    /// # Errors
    /// Returns `DecodeError` if the field is missing or not UTF-8.
    pub fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let index = self.index;
        let field = self.next_field().ok_or(DecodeError::MissingField {
            msg_id: self.msg_id,
            index,
        })?;
        Ok(std::str::from_utf8(field)?)
    }

    /// Reads the next field as an owned string.
    ///
    /// # Errors
    /// Returns `DecodeError` if the field is missing or not UTF-8.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        self.read_str().map(str::to_string)
    }

    /// Reads and parses the next field. An empty field yields the default.
    ///
    /// # Errors
    /// Returns `DecodeError` if the field is missing or does not parse.
    pub fn read<T: FromStr + Default>(&mut self) -> Result<T, DecodeError> {
        let index = self.index;
        let text = self.read_str()?;
        if text.is_empty() {
            return Ok(T::default());
        }
        text.parse().map_err(|_| DecodeError::InvalidFieldValue {
            msg_id: self.msg_id,
            index,
            value: text.to_string(),
        })
    }

    /// Reads an integer field as a boolean.
    ///
    /// # Errors
    /// Returns `DecodeError` if the field is missing or not an integer.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read::<i32>()? != 0)
    }

    /// Reads a row count.
    ///
    /// # Errors
    /// Returns `DecodeError` if the field is missing, not an integer or negative.
    pub fn read_count(&mut self) -> Result<usize, DecodeError> {
        let index = self.index;
        let count: i64 = self.read()?;
        usize::try_from(count).map_err(|_| DecodeError::InvalidFieldValue {
            msg_id: self.msg_id,
            index,
            value: count.to_string(),
        })
    }

    /// Reads the leading message id.
    ///
    /// # Errors
    /// Returns `DecodeError::EmptyMessage` or `DecodeError::InvalidMessageId`.
    pub fn read_msg_id(&mut self) -> Result<i32, DecodeError> {
        let field = self.next_field().ok_or(DecodeError::EmptyMessage)?;
        let text = std::str::from_utf8(field)?;
        let msg_id = text
            .parse()
            .map_err(|_| DecodeError::InvalidMessageId(text.to_string()))?;
        self.msg_id = msg_id;
        Ok(msg_id)
    }
}

/// Rows reserved up front for multi-row messages; larger counts grow on demand.
const MAX_PREALLOCATED_ROWS: usize = 256;

/// Reads the contract block shared by the contract-details messages.
fn read_contract(r: &mut FieldReader<'_>) -> Result<ContractSummary, DecodeError> {
    Ok(ContractSummary {
        con_id: r.read()?,
        symbol: r.read_string()?,
        sec_type: r.read_string()?,
        exchange: r.read_string()?,
        currency: r.read_string()?,
        long_name: r.read_string()?,
    })
}

/// Decodes one frame payload into a gateway event.
///
/// # Errors
/// Returns `DecodeError` if the payload does not match the message layout.
pub fn decode_event(payload: &[u8]) -> Result<GatewayEvent, DecodeError> {
    let mut r = FieldReader::new(payload);
    let msg_id = r.read_msg_id()?;

    let known = matches!(
        msg_id,
        incoming::TICK_PRICE
            | incoming::TICK_SIZE
            | incoming::ORDER_STATUS
            | incoming::ERR_MSG
            | incoming::OPEN_ORDER
            | incoming::ACCT_VALUE
            | incoming::PORTFOLIO_VALUE
            | incoming::ACCT_UPDATE_TIME
            | incoming::NEXT_VALID_ID
            | incoming::CONTRACT_DATA
            | incoming::EXECUTION_DATA
            | incoming::MARKET_DEPTH
            | incoming::MARKET_DEPTH_L2
            | incoming::NEWS_BULLETINS
            | incoming::MANAGED_ACCTS
            | incoming::RECEIVE_FA
            | incoming::HISTORICAL_DATA
            | incoming::BOND_CONTRACT_DATA
            | incoming::SCANNER_PARAMETERS
            | incoming::SCANNER_DATA
            | incoming::TICK_OPTION_COMPUTATION
            | incoming::TICK_GENERIC
            | incoming::TICK_STRING
            | incoming::TICK_EFP
            | incoming::CURRENT_TIME
            | incoming::REAL_TIME_BARS
            | incoming::FUNDAMENTAL_DATA
            | incoming::CONTRACT_DATA_END
            | incoming::OPEN_ORDER_END
            | incoming::ACCT_DOWNLOAD_END
            | incoming::EXECUTION_DATA_END
            | incoming::DELTA_NEUTRAL_VALIDATION
            | incoming::TICK_SNAPSHOT_END
            | incoming::MARKET_DATA_TYPE
    );
    if !known {
        return Ok(GatewayEvent::Unhandled { msg_id });
    }

    let _version: i32 = r.read()?;

    let event = match msg_id {
        incoming::TICK_PRICE => GatewayEvent::TickPrice {
            ticker_id: TickerId::new(r.read()?),
            field: TickField::new(r.read()?),
            price: r.read()?,
            can_auto_execute: r.read_bool()?,
        },
        incoming::TICK_SIZE => GatewayEvent::TickSize {
            ticker_id: TickerId::new(r.read()?),
            field: TickField::new(r.read()?),
            size: r.read()?,
        },
        incoming::ORDER_STATUS => {
            let order_id = OrderId::new(r.read()?);
            let status = OrderStatus::from_str(r.read_str()?).unwrap_or_else(|never| match never {});
            GatewayEvent::OrderStatus(OrderStatusUpdate {
                order_id,
                status,
                filled: r.read()?,
                remaining: r.read()?,
                avg_fill_price: r.read()?,
                perm_id: r.read()?,
                parent_id: r.read()?,
                last_fill_price: r.read()?,
                client_id: r.read()?,
                why_held: r.read_string()?,
            })
        }
        incoming::ERR_MSG => GatewayEvent::Error {
            id: r.read()?,
            code: r.read()?,
            message: r.read_string()?,
        },
        incoming::ACCT_VALUE => GatewayEvent::AccountValue {
            key: r.read_string()?,
            value: r.read_string()?,
            currency: r.read_string()?,
            account: r.read_string()?,
        },
        incoming::OPEN_ORDER => GatewayEvent::OpenOrder(OpenOrderSummary {
            order_id: OrderId::new(r.read()?),
            symbol: r.read_string()?,
            action: r.read_string()?,
            quantity: r.read()?,
            order_type: r.read_string()?,
            status: r.read_string()?,
        }),
        incoming::PORTFOLIO_VALUE => GatewayEvent::PortfolioUpdate(PortfolioPosition {
            symbol: r.read_string()?,
            position: r.read()?,
            market_price: r.read()?,
            market_value: r.read()?,
            average_cost: r.read()?,
            unrealized_pnl: r.read()?,
            realized_pnl: r.read()?,
            account: r.read_string()?,
        }),
        incoming::CONTRACT_DATA => GatewayEvent::ContractDetails {
            req_id: r.read()?,
            contract: read_contract(&mut r)?,
        },
        incoming::BOND_CONTRACT_DATA => GatewayEvent::BondContractDetails {
            req_id: r.read()?,
            contract: read_contract(&mut r)?,
        },
        incoming::EXECUTION_DATA => GatewayEvent::ExecDetails {
            req_id: r.read()?,
            execution: Execution {
                order_id: OrderId::new(r.read()?),
                exec_id: r.read_string()?,
                symbol: r.read_string()?,
                side: r.read_string()?,
                shares: r.read()?,
                price: r.read()?,
                time: r.read_string()?,
            },
        },
        incoming::HISTORICAL_DATA => {
            let req_id = r.read()?;
            let start = r.read_string()?;
            let end = r.read_string()?;
            let count = r.read_count()?;
            let mut bars = Vec::with_capacity(count.min(MAX_PREALLOCATED_ROWS));
            for _ in 0..count {
                bars.push(HistoricalBar {
                    date: r.read_string()?,
                    open: r.read()?,
                    high: r.read()?,
                    low: r.read()?,
                    close: r.read()?,
                    volume: r.read()?,
                    wap: r.read()?,
                    bar_count: r.read()?,
                    has_gaps: r.read_bool()?,
                });
            }
            GatewayEvent::HistoricalData {
                req_id,
                start,
                end,
                bars,
            }
        }
        incoming::SCANNER_DATA => {
            let req_id = r.read()?;
            let count = r.read_count()?;
            let mut rows = Vec::with_capacity(count.min(MAX_PREALLOCATED_ROWS));
            for _ in 0..count {
                rows.push(ScannerRow {
                    rank: r.read()?,
                    con_id: r.read()?,
                    symbol: r.read_string()?,
                    distance: r.read_string()?,
                    benchmark: r.read_string()?,
                    projection: r.read_string()?,
                    legs: r.read_string()?,
                });
            }
            GatewayEvent::ScannerData { req_id, rows }
        }
        incoming::TICK_OPTION_COMPUTATION => GatewayEvent::TickOptionComputation {
            ticker_id: TickerId::new(r.read()?),
            field: TickField::new(r.read()?),
            computation: OptionComputation {
                implied_vol: r.read()?,
                delta: r.read()?,
                option_price: r.read()?,
                pv_dividend: r.read()?,
                gamma: r.read()?,
                vega: r.read()?,
                theta: r.read()?,
                underlying_price: r.read()?,
            },
        },
        incoming::TICK_EFP => GatewayEvent::TickEfp {
            ticker_id: TickerId::new(r.read()?),
            field: TickField::new(r.read()?),
            basis_points: r.read()?,
            formatted_basis_points: r.read_string()?,
            total_dividends: r.read()?,
            hold_days: r.read()?,
            future_expiry: r.read_string()?,
        },
        incoming::DELTA_NEUTRAL_VALIDATION => GatewayEvent::DeltaNeutralValidation {
            req_id: r.read()?,
            con_id: r.read()?,
            delta: r.read()?,
            price: r.read()?,
        },
        incoming::ACCT_UPDATE_TIME => GatewayEvent::AccountTime(r.read_string()?),
        incoming::NEXT_VALID_ID => GatewayEvent::NextValidId(OrderId::new(r.read()?)),
        incoming::MARKET_DEPTH => GatewayEvent::MarketDepth {
            ticker_id: TickerId::new(r.read()?),
            position: r.read()?,
            operation: r.read()?,
            side: r.read()?,
            price: r.read()?,
            size: r.read()?,
        },
        incoming::MARKET_DEPTH_L2 => GatewayEvent::MarketDepthL2 {
            ticker_id: TickerId::new(r.read()?),
            position: r.read()?,
            market_maker: r.read_string()?,
            operation: r.read()?,
            side: r.read()?,
            price: r.read()?,
            size: r.read()?,
        },
        incoming::NEWS_BULLETINS => GatewayEvent::NewsBulletin {
            msg_id: r.read()?,
            msg_type: r.read()?,
            message: r.read_string()?,
            origin_exchange: r.read_string()?,
        },
        incoming::MANAGED_ACCTS => GatewayEvent::ManagedAccounts(r.read_string()?),
        incoming::RECEIVE_FA => GatewayEvent::ReceiveFa {
            data_type: r.read()?,
            xml: r.read_string()?,
        },
        incoming::SCANNER_PARAMETERS => GatewayEvent::ScannerParameters(r.read_string()?),
        incoming::TICK_GENERIC => GatewayEvent::TickGeneric {
            ticker_id: TickerId::new(r.read()?),
            field: TickField::new(r.read()?),
            value: r.read()?,
        },
        incoming::TICK_STRING => GatewayEvent::TickString {
            ticker_id: TickerId::new(r.read()?),
            field: TickField::new(r.read()?),
            value: r.read_string()?,
        },
        incoming::CURRENT_TIME => GatewayEvent::CurrentTime(r.read()?),
        incoming::REAL_TIME_BARS => GatewayEvent::RealtimeBar {
            req_id: r.read()?,
            time: r.read()?,
            open: r.read()?,
            high: r.read()?,
            low: r.read()?,
            close: r.read()?,
            volume: r.read()?,
            wap: r.read()?,
            count: r.read()?,
        },
        incoming::FUNDAMENTAL_DATA => GatewayEvent::FundamentalData {
            req_id: r.read()?,
            data: r.read_string()?,
        },
        incoming::CONTRACT_DATA_END => GatewayEvent::ContractDetailsEnd(r.read()?),
        incoming::OPEN_ORDER_END => GatewayEvent::OpenOrderEnd,
        incoming::ACCT_DOWNLOAD_END => GatewayEvent::AccountDownloadEnd(r.read_string()?),
        incoming::EXECUTION_DATA_END => GatewayEvent::ExecDetailsEnd(r.read()?),
        incoming::TICK_SNAPSHOT_END => GatewayEvent::TickSnapshotEnd(r.read()?),
        incoming::MARKET_DATA_TYPE => GatewayEvent::MarketDataType {
            req_id: r.read()?,
            data_type: r.read()?,
        },
        _ => GatewayEvent::Unhandled { msg_id },
    };

    Ok(event)
}

/// Decodes the gateway's handshake reply: server version and connection time.
///
/// # Errors
/// Returns `DecodeError` if the reply is malformed.
pub fn decode_server_hello(payload: &[u8]) -> Result<(i32, String), DecodeError> {
    let mut r = FieldReader::new(payload);
    let version = r.read_msg_id()?;
    let connection_time = r.read_string().unwrap_or_default();
    Ok((version, connection_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelink_core::types::Side;

    fn payload(fields: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for field in fields {
            out.extend_from_slice(field.as_bytes());
            out.push(NUL);
        }
        out
    }

    #[test]
    fn test_field_writer_basic() {
        let mut w = FieldWriter::new(4, 1);
        w.put_int(42);
        w.put_bool(true);
        w.put_str("x");

        assert_eq!(&w.finish()[..], b"4\x001\x0042\x001\x00x\x00");
    }

    #[test]
    fn test_encode_cancel_order() {
        let bytes = encode_cancel_order(OrderId::new(17));
        assert_eq!(&bytes[..], b"4\x001\x0017\x00");
    }

    #[test]
    fn test_encode_current_time() {
        assert_eq!(&encode_request_current_time()[..], b"49\x001\x00");
    }

    #[test]
    fn test_encode_place_order_fields() {
        let intent = OrderIntent::limit(
            Instrument::stock("MSFT"),
            Side::Buy,
            Decimal::from(1000),
            Decimal::new(1, 2),
        );
        let bytes = encode_place_order(OrderId::new(5), &intent);
        let mut r = FieldReader::new(&bytes);
        let fields: Vec<&str> = std::iter::from_fn(|| r.read_str().ok()).collect();

        assert_eq!(fields[0], "3");
        assert_eq!(fields[2], "5");
        assert_eq!(fields[4], "MSFT");
        assert_eq!(fields[5], "STK");
        assert_eq!(fields[10], "SMART");
        assert_eq!(fields[12], "USD");
        assert_eq!(&fields[15..19], &["BUY", "1000", "LMT", "0.01"]);
    }

    #[test]
    fn test_encode_market_data_snapshot_flag() {
        let bytes = encode_request_market_data(TickerId::new(1), &Instrument::stock("MSFT"), true);
        let mut r = FieldReader::new(&bytes);
        let fields: Vec<&str> = std::iter::from_fn(|| r.read_str().ok()).collect();

        assert_eq!(fields[0], "1");
        assert_eq!(fields[2], "1");
        assert_eq!(fields[4], "MSFT");
        assert_eq!(fields[fields.len() - 3], "1");
    }

    #[test]
    fn test_encode_start_api() {
        assert_eq!(&encode_start_api(0)[..], b"71\x002\x000\x00\x00");
    }

    #[test]
    fn test_decode_order_status() {
        let bytes = payload(&[
            "3", "6", "12", "Submitted", "0", "1000", "0", "99", "0", "0", "0", "",
        ]);
        let event = decode_event(&bytes).unwrap();

        let GatewayEvent::OrderStatus(update) = event else {
            panic!("expected order status");
        };
        assert_eq!(update.order_id, OrderId::new(12));
        assert_eq!(update.status, OrderStatus::Submitted);
        assert_eq!(update.remaining, Decimal::from(1000));
        assert_eq!(update.perm_id, 99);
    }

    #[test]
    fn test_decode_error_event() {
        let bytes = payload(&["4", "2", "-1", "1100", "Connectivity lost"]);
        assert_eq!(
            decode_event(&bytes).unwrap(),
            GatewayEvent::Error {
                id: -1,
                code: 1100,
                message: "Connectivity lost".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_current_time_and_next_id() {
        let bytes = payload(&["49", "1", "1700000000"]);
        assert_eq!(
            decode_event(&bytes).unwrap(),
            GatewayEvent::CurrentTime(1_700_000_000)
        );

        let bytes = payload(&["9", "1", "42"]);
        assert_eq!(
            decode_event(&bytes).unwrap(),
            GatewayEvent::NextValidId(OrderId::new(42))
        );
    }

    #[test]
    fn test_decode_tick_price_and_size() {
        let bytes = payload(&["1", "3", "1", "2", "101.25", "1"]);
        assert_eq!(
            decode_event(&bytes).unwrap(),
            GatewayEvent::TickPrice {
                ticker_id: TickerId::new(1),
                field: TickField::ASK,
                price: 101.25,
                can_auto_execute: true,
            }
        );

        let bytes = payload(&["2", "1", "1", "3", "300"]);
        assert_eq!(
            decode_event(&bytes).unwrap(),
            GatewayEvent::TickSize {
                ticker_id: TickerId::new(1),
                field: TickField::ASK_SIZE,
                size: Decimal::from(300),
            }
        );
    }

    #[test]
    fn test_decode_unknown_id_is_unhandled() {
        let bytes = payload(&["99", "30", "whatever"]);
        assert_eq!(
            decode_event(&bytes).unwrap(),
            GatewayEvent::Unhandled { msg_id: 99 }
        );
    }

    #[test]
    fn test_decode_out_of_scope_messages() {
        let cases: Vec<(i32, Vec<&str>)> = vec![
            (incoming::OPEN_ORDER, vec!["5", "30", "7", "MSFT", "BUY", "1000", "LMT", "Submitted"]),
            (
                incoming::PORTFOLIO_VALUE,
                vec!["7", "8", "MSFT", "100", "410.5", "41050", "400", "1050", "0", "DU123"],
            ),
            (
                incoming::CONTRACT_DATA,
                vec!["10", "8", "2", "272093", "MSFT", "STK", "SMART", "USD", "MICROSOFT CORP"],
            ),
            (
                incoming::BOND_CONTRACT_DATA,
                vec!["18", "6", "3", "1", "T", "BOND", "SMART", "USD", "US TREASURY"],
            ),
            (
                incoming::EXECUTION_DATA,
                vec!["11", "9", "1", "7", "0001", "MSFT", "BOT", "100", "410.5", "20260127 10:00:00"],
            ),
            (
                incoming::HISTORICAL_DATA,
                vec!["17", "3", "4", "20260101", "20260102", "1", "20260101", "1", "2", "0.5", "1.5", "300", "1.2", "7", "0"],
            ),
            (
                incoming::SCANNER_DATA,
                vec!["20", "3", "9", "1", "0", "272093", "MSFT", "", "", "", ""],
            ),
            (
                incoming::TICK_OPTION_COMPUTATION,
                vec!["21", "6", "1", "13", "0.25", "0.5", "3.1", "0", "0.02", "0.1", "-0.05", "410"],
            ),
            (
                incoming::TICK_EFP,
                vec!["47", "1", "1", "38", "1.5", "1.50", "0.8", "30", "20261218"],
            ),
            (incoming::DELTA_NEUTRAL_VALIDATION, vec!["56", "1", "1", "8314", "0.5", "410"]),
        ];

        for (msg_id, fields) in cases {
            let event = decode_event(&payload(&fields)).unwrap();
            assert!(
                !matches!(event, GatewayEvent::Unhandled { .. }),
                "message {msg_id} decoded as unhandled"
            );
        }
    }

    #[test]
    fn test_decode_historical_bars() {
        let bytes = payload(&[
            "17", "3", "4", "20260101", "20260102", "2", "20260101", "1", "2", "0.5", "1.5",
            "300", "1.2", "7", "0", "20260102", "1.5", "2.5", "1", "2", "400", "1.8", "9", "1",
        ]);
        let GatewayEvent::HistoricalData {
            req_id,
            start,
            end,
            bars,
        } = decode_event(&bytes).unwrap()
        else {
            panic!("expected historical data");
        };

        assert_eq!(req_id, 4);
        assert_eq!((start.as_str(), end.as_str()), ("20260101", "20260102"));
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, "20260102");
        assert_eq!(bars[1].volume, Decimal::from(400));
        assert!(bars[1].has_gaps);
    }

    #[test]
    fn test_decode_scanner_rows_and_truncation() {
        let bytes = payload(&[
            "20", "3", "9", "2", "0", "272093", "MSFT", "", "", "", "", "1", "265598", "AAPL",
            "", "", "", "",
        ]);
        let GatewayEvent::ScannerData { req_id, rows } = decode_event(&bytes).unwrap() else {
            panic!("expected scanner data");
        };
        assert_eq!(req_id, 9);
        assert_eq!(rows[1].symbol, "AAPL");

        let short = payload(&["20", "3", "9", "2", "0", "272093", "MSFT", "", "", "", ""]);
        assert!(matches!(
            decode_event(&short),
            Err(DecodeError::MissingField { msg_id: 20, .. })
        ));

        let negative = payload(&["20", "3", "9", "-1"]);
        assert!(matches!(
            decode_event(&negative),
            Err(DecodeError::InvalidFieldValue { msg_id: 20, index: 3, .. })
        ));
    }

    #[test]
    fn test_decode_missing_field() {
        let bytes = payload(&["49", "1"]);
        assert_eq!(
            decode_event(&bytes),
            Err(DecodeError::MissingField {
                msg_id: 49,
                index: 2
            })
        );
    }

    #[test]
    fn test_decode_invalid_value() {
        let bytes = payload(&["9", "1", "abc"]);
        assert!(matches!(
            decode_event(&bytes),
            Err(DecodeError::InvalidFieldValue { msg_id: 9, .. })
        ));
    }

    #[test]
    fn test_decode_empty_and_bad_id() {
        assert_eq!(decode_event(b""), Err(DecodeError::EmptyMessage));
        assert_eq!(
            decode_event(b"x\x00"),
            Err(DecodeError::InvalidMessageId("x".to_string()))
        );
    }

    #[test]
    fn test_decode_server_hello() {
        let bytes = payload(&["151", "20260127 10:00:00 UTC"]);
        let (version, time) = decode_server_hello(&bytes).unwrap();
        assert_eq!(version, 151);
        assert_eq!(time, "20260127 10:00:00 UTC");
    }
}
