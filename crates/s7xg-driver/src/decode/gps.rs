//! GNSS reply decoders.
//!
//! A `gps get_data` reply has one grammar per coordinate format:
//!
//! ```text
//! RAW UTC( 23/5/1 12:30:00 ) LAT( 24.1234 N ) LONG( 120.5678 E ) POSITIONING( 2.5s )
//! DD  UTC( 23/5/1 12:30:00 ) LAT( 24.1234 N ) LONG( 120.5678 E ) POSITIONING( 2.5s )
//! DMS UTC( 23/5/1 12:30:00 ) LAT( 24*7'24.24" N ) LONG( 120 * 34'4.08" E ) POSITIONING( 2.5s )
//! ```
//!
//! While the receiver is still searching it answers `POSITIONING ( 12.0s )`
//! instead, and it answers with a status word when it is not running.

use serde::Serialize;

use crate::decode::fields::{short_scan, FieldScanner};
use crate::error::{DriverError, Result};
use crate::status::Status;
use crate::types::{GpsDataFormat, GpsMode, GpsStartMode, SatelliteSystem, UplinkFormat};

/// UTC timestamp of a fix, as printed by the module (two-digit year).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// One axis in degrees, minutes and seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dms {
    pub degrees: i32,
    pub minutes: i32,
    pub seconds: f64,
}

impl Dms {
    /// Convert to decimal degrees. The sign follows `degrees`.
    pub fn to_decimal(&self) -> f64 {
        let magnitude = f64::from(self.degrees.unsigned_abs())
            + f64::from(self.minutes) / 60.0
            + self.seconds / 3600.0;
        if self.degrees < 0 {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Latitude and longitude in the representation that was requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Coordinates {
    Raw { latitude: f64, longitude: f64 },
    Decimal { latitude: f64, longitude: f64 },
    Dms { latitude: Dms, longitude: Dms },
}

impl Coordinates {
    fn empty(format: GpsDataFormat) -> Self {
        match format {
            GpsDataFormat::Raw => Coordinates::Raw {
                latitude: 0.0,
                longitude: 0.0,
            },
            GpsDataFormat::Dd => Coordinates::Decimal {
                latitude: 0.0,
                longitude: 0.0,
            },
            GpsDataFormat::Dms => Coordinates::Dms {
                latitude: Dms::default(),
                longitude: Dms::default(),
            },
        }
    }

    /// `(latitude, longitude)` in decimal degrees regardless of format.
    pub fn to_decimal(&self) -> (f64, f64) {
        match self {
            Coordinates::Raw {
                latitude,
                longitude,
            }
            | Coordinates::Decimal {
                latitude,
                longitude,
            } => (*latitude, *longitude),
            Coordinates::Dms {
                latitude,
                longitude,
            } => (latitude.to_decimal(), longitude.to_decimal()),
        }
    }
}

/// A decoded position report.
///
/// When `valid` is false the reply was cut short and the remaining fields
/// hold whatever was scanned before the mismatch; treat them as undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFix {
    pub format: GpsDataFormat,
    pub time: FixTime,
    pub coordinates: Coordinates,
    /// Seconds the receiver took to reach this fix.
    pub elapsed: f32,
    pub valid: bool,
}

impl PositionFix {
    /// Turn an invalid fix into a decode error.
    pub fn require_valid(self, payload: &str) -> Result<PositionFix> {
        if self.valid {
            Ok(self)
        } else {
            Err(short_scan(
                "position fix",
                field_count(self.format),
                scan(payload, self.format).1,
                payload,
            ))
        }
    }
}

/// Answer to a position query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GpsReading {
    Fix(PositionFix),
    /// No fix yet; `elapsed` is how long the receiver has been searching.
    Acquiring { elapsed: Option<f32> },
}

/// Conversions a complete reply yields for `format`.
pub fn field_count(format: GpsDataFormat) -> usize {
    match format {
        GpsDataFormat::Raw | GpsDataFormat::Dd => 9,
        GpsDataFormat::Dms => 13,
    }
}

/// Decode a `gps get_data <format>` reply.
///
/// The GNSS status words are checked first, by exact equality, and come back
/// as errors with no fix. A reply that scans short comes back as a fix with
/// `valid == false`.
pub fn decode_fix(text: &str, format: GpsDataFormat) -> Result<GpsReading> {
    if let Some(err) = Status::classify(text).and_then(|s| s.into_error(&query(format))) {
        return Err(err);
    }

    if text.starts_with("POSITIONING") {
        let mut scanner = FieldScanner::new(text);
        let elapsed = scanner
            .literal("POSITIONING ( ")
            .and_then(|_| scanner.field::<f32>());
        return Ok(GpsReading::Acquiring { elapsed });
    }

    let (mut fix, converted) = scan(text, format);
    fix.valid = converted == field_count(format);
    Ok(GpsReading::Fix(fix))
}

fn query(format: GpsDataFormat) -> String {
    format!("gps get_data {format}")
}

fn scan(text: &str, format: GpsDataFormat) -> (PositionFix, usize) {
    let mut fix = PositionFix {
        format,
        time: FixTime::default(),
        coordinates: Coordinates::empty(format),
        elapsed: 0.0,
        valid: false,
    };
    let mut scanner = FieldScanner::new(text);
    let _ = scan_fix(&mut scanner, &mut fix);
    (fix, scanner.converted())
}

fn scan_fix(s: &mut FieldScanner<'_>, fix: &mut PositionFix) -> Option<()> {
    s.literal(fix.format.tag())?;
    s.literal(" UTC( ")?;
    fix.time.year = s.field()?;
    s.literal("/")?;
    fix.time.month = s.field()?;
    s.literal("/")?;
    fix.time.day = s.field()?;
    s.literal(" ")?;
    fix.time.hour = s.field()?;
    s.literal(":")?;
    fix.time.minute = s.field()?;
    s.literal(":")?;
    fix.time.second = s.field()?;

    match &mut fix.coordinates {
        Coordinates::Raw {
            latitude,
            longitude,
        }
        | Coordinates::Decimal {
            latitude,
            longitude,
        } => {
            s.literal(" ) LAT( ")?;
            *latitude = s.field()?;
            s.literal(" N ) LONG( ")?;
            *longitude = s.field()?;
            s.literal(" E )")?;
        }
        Coordinates::Dms {
            latitude,
            longitude,
        } => {
            s.literal(" ) LAT( ")?;
            scan_dms(s, latitude)?;
            s.literal("\" N ) LONG( ")?;
            scan_dms(s, longitude)?;
            s.literal("\" E )")?;
        }
    }

    s.literal(" POSITIONING( ")?;
    fix.elapsed = s.field()?;
    s.literal("s )")
}

fn scan_dms(s: &mut FieldScanner<'_>, axis: &mut Dms) -> Option<()> {
    axis.degrees = s.field()?;
    s.literal(" * ")?;
    axis.minutes = s.field()?;
    s.literal("'")?;
    axis.seconds = s.field()?;
    Some(())
}

/// Decoded `gps get_mode` reply, e.g. `manual hot 20 1000 ipso gps 1PPS_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpsModeRecord {
    /// `off` is reported as [`GpsMode::Idle`].
    pub mode: GpsMode,
    pub start: GpsStartMode,
    pub uplink_port: u8,
    /// Positioning cycle in milliseconds.
    pub cycle_ms: u32,
    pub uplink_format: UplinkFormat,
    pub satellite_system: SatelliteSystem,
    /// Pulse-per-second output; older firmware omits it.
    pub pps: Option<bool>,
}

const MODE_FIELDS: usize = 7;

/// Decode a `gps get_mode` reply.
pub fn decode_mode(text: &str) -> Result<GpsModeRecord> {
    if let Some(err) = Status::classify(text).and_then(|s| s.into_error("gps get_mode")) {
        return Err(err);
    }

    let mut s = FieldScanner::new(text);
    let short = |s: &FieldScanner<'_>| short_scan("gps mode", MODE_FIELDS, s.converted(), text);
    let unknown = |word: &str| DriverError::UnexpectedReply {
        command: "gps get_mode".to_string(),
        reply: format!("{text} (unknown word {word:?})"),
    };

    let mode = match s.word().ok_or_else(|| short(&s))? {
        "off" => GpsMode::Idle,
        word => word.parse().map_err(|_| unknown(word))?,
    };
    let start: GpsStartMode = parse_word(&mut s).ok_or_else(|| short(&s))?.map_err(&unknown)?;
    let uplink_port = s.field::<u8>().ok_or_else(|| short(&s))?;
    let cycle_ms = s.field::<u32>().ok_or_else(|| short(&s))?;
    let uplink_format: UplinkFormat = parse_word(&mut s).ok_or_else(|| short(&s))?.map_err(&unknown)?;
    let satellite_system: SatelliteSystem = parse_word(&mut s).ok_or_else(|| short(&s))?.map_err(&unknown)?;
    let pps = match s.word() {
        None => None,
        Some("1PPS_on") => Some(true),
        Some("1PPS_off") => Some(false),
        Some(word) => return Err(unknown(word)),
    };

    Ok(GpsModeRecord {
        mode,
        start,
        uplink_port,
        cycle_ms,
        uplink_format,
        satellite_system,
        pps,
    })
}

fn parse_word<'a, T: std::str::FromStr>(
    s: &mut FieldScanner<'a>,
) -> Option<std::result::Result<T, &'a str>> {
    s.word().map(|word| word.parse().map_err(|_| word))
}
