use env_logger::fmt::Color;
use log::Level;

fn level_color(level: Level) -> Color {
  match level {
    Level::Error => Color::Red,
    Level::Warn => Color::Yellow,
    Level::Info => Color::Green,
    Level::Debug => Color::Magenta,
    Level::Trace => Color::Blue,
  }
}

// Source location of a log record, with the `src/` prefix dropped.
fn location(record: &log::Record) -> String {
  let file = record.file().unwrap_or("?");
  let file = file.strip_prefix("src/").unwrap_or(file);
  format!("{}:{}", file, record.line().unwrap_or(0))
}

// `env_logger` format: location padded to a column, then the message, coloured by level.
pub fn format_log(
  buf: &mut env_logger::fmt::Formatter,
  record: &log::Record,
) -> std::io::Result<()> {
  use std::io::Write;
  let mut style = buf.style();
  style.set_color(level_color(record.level()));
  let s = format!("{:24}{}", location(record), record.args());
  writeln!(buf, "{}", style.value(s))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_location() {
    let record = log::Record::builder()
      .args(format_args!("message"))
      .file(Some("src/intrinsic.rs"))
      .line(Some(42))
      .build();
    assert_eq!(location(&record), "intrinsic.rs:42");
    let record = log::Record::builder().args(format_args!("message")).build();
    assert_eq!(location(&record), "?:0");
  }
}
