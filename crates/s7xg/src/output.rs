use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use s7xg_driver::{RfEvent, Status};
use s7xg_frame::hex;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    command: &'a str,
    reply: &'a str,
    status: Option<&'a str>,
    description: Option<&'a str>,
}

/// One reply frame to a command sent with `s7xg send`.
pub fn print_reply(command: &str, reply: &str, format: OutputFormat) {
    let status = Status::classify(reply);
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                command,
                reply,
                status: status.map(|s| s.token()),
                description: status.map(|s| s.description()),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = table(vec!["COMMAND", "REPLY", "STATUS"]);
            table.add_row(vec![
                command.to_string(),
                reply.to_string(),
                status.map(|s| s.description()).unwrap_or("-").to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match status {
            Some(status) => println!("{command} -> {reply} ({})", status.description()),
            None => println!("{command} -> {reply}"),
        },
        OutputFormat::Raw => println!("{reply}"),
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    event: &'a RfEvent,
    size: usize,
    text: Option<&'a str>,
    timestamp: String,
}

/// One received radio packet.
pub fn print_event(event: &RfEvent, format: OutputFormat) {
    let text = std::str::from_utf8(&event.data).ok();
    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                event,
                size: event.data.len(),
                text,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = table(vec!["SIZE", "RSSI", "SNR", "DATA"]);
            table.add_row(vec![
                event.data.len().to_string(),
                event.rssi.to_string(),
                event.snr.to_string(),
                payload_preview(&event.data),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "rssi={} snr={} size={} data={}",
                event.rssi,
                event.snr,
                event.data.len(),
                payload_preview(&event.data)
            );
        }
        OutputFormat::Raw => print_raw(&event.data),
    }
}

/// A record with a JSON form and a key/value form for humans.
pub fn print_record<T: Serialize>(
    value: &T,
    fields: &[(&str, String)],
    raw: &str,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => {
            let mut table = table(vec!["FIELD", "VALUE"]);
            for (name, value) in fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, value) in fields {
                println!("  {name:<width$}  {value}");
            }
        }
        OutputFormat::Raw => println!("{raw}"),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => hex::encode_upper(payload),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
