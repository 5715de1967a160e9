use std::thread;
use std::time::{Duration, Instant};

use s7xg_driver::decode::{Coordinates, GpsReading, PositionFix};
use s7xg_driver::GpsStart;
use tracing::info;

use crate::cmd::{parse_duration, GpsArgs, LinkArgs};
use crate::exit::{driver_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_record, OutputFormat};

const QUERY_INTERVAL: Duration = Duration::from_secs(1);

pub fn run(args: GpsArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = args.wait.as_deref().map(parse_duration).transpose()?;
    let mut device = link.open()?;

    if args.start {
        device
            .gps_start(&GpsStart::default())
            .map_err(|err| driver_error("gps start failed", err))?;
    }

    let started = Instant::now();
    let reading = loop {
        let reading = device
            .gps_data(args.fix_format.into())
            .map_err(|err| driver_error("gps query failed", err))?;
        let searching = matches!(reading, GpsReading::Acquiring { .. });
        match wait {
            Some(limit) if searching && started.elapsed() < limit => {
                info!(elapsed_s = started.elapsed().as_secs(), "waiting for fix");
                thread::sleep(QUERY_INTERVAL);
            }
            Some(limit) if searching => {
                return Err(CliError::new(
                    TIMEOUT,
                    format!("no fix within {limit:?}"),
                ));
            }
            _ => break reading,
        }
    };

    print_record(&reading, &fields(&reading), &raw_line(&reading), format);
    Ok(SUCCESS)
}

fn fields(reading: &GpsReading) -> Vec<(&'static str, String)> {
    match reading {
        GpsReading::Acquiring { elapsed } => vec![
            ("State", "acquiring".to_string()),
            (
                "Searching",
                elapsed
                    .map(|s| format!("{s}s"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ],
        GpsReading::Fix(fix) => {
            let (latitude, longitude) = coordinate_text(&fix.coordinates);
            vec![
                ("State", if fix.valid { "fix" } else { "incomplete" }.to_string()),
                ("Format", fix.format.tag().to_string()),
                ("UTC", time_text(fix)),
                ("Latitude", latitude),
                ("Longitude", longitude),
                ("TTFF", format!("{}s", fix.elapsed)),
            ]
        }
    }
}

fn raw_line(reading: &GpsReading) -> String {
    match reading {
        GpsReading::Acquiring { .. } => "acquiring".to_string(),
        GpsReading::Fix(fix) => {
            let (latitude, longitude) = fix.coordinates.to_decimal();
            format!("{latitude} {longitude}")
        }
    }
}

fn time_text(fix: &PositionFix) -> String {
    let t = &fix.time;
    format!(
        "{}/{}/{} {:02}:{:02}:{:02}",
        t.year, t.month, t.day, t.hour, t.minute, t.second
    )
}

fn coordinate_text(coordinates: &Coordinates) -> (String, String) {
    match coordinates {
        Coordinates::Raw {
            latitude,
            longitude,
        }
        | Coordinates::Decimal {
            latitude,
            longitude,
        } => (latitude.to_string(), longitude.to_string()),
        Coordinates::Dms {
            latitude,
            longitude,
        } => (
            format!(
                "{}°{}'{}\"",
                latitude.degrees, latitude.minutes, latitude.seconds
            ),
            format!(
                "{}°{}'{}\"",
                longitude.degrees, longitude.minutes, longitude.seconds
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use s7xg_driver::decode::decode_fix;
    use s7xg_driver::GpsDataFormat;

    use super::*;

    #[test]
    fn fix_fields_are_readable() {
        let reading = decode_fix(
            "RAW UTC( 23/5/1 12:30:00 ) LAT( 24.1234 N ) LONG( 120.5678 E ) POSITIONING( 2.5s )",
            GpsDataFormat::Raw,
        )
        .unwrap();

        let fields = fields(&reading);
        assert_eq!(fields[0], ("State", "fix".to_string()));
        assert_eq!(fields[2], ("UTC", "23/5/1 12:30:00".to_string()));
        assert_eq!(fields[3], ("Latitude", "24.1234".to_string()));
        assert_eq!(fields[5], ("TTFF", "2.5s".to_string()));
    }
}
