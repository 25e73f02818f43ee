use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use std::fs::File;
use std::io::{BufRead, BufReader};
#[cfg(feature = "main")]
use std::env;
use std::path::Path;

/// Strip whitespace and `#` comments, dropping lines left empty
pub fn line_filter(line: &str) -> Option<String> {
    let comment_removed = line.split('#').next()?.trim();
    if comment_removed.is_empty() {
        return None;
    }
    Some(comment_removed.to_string())
}

/// Read the meaningful lines of a gossip capture file
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        if let Some(line) = line_filter(&line?) {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Logging levels: a default, then per-target overrides, as in
/// `info,lightning_gossip::pending=trace`
#[derive(Clone, Debug, PartialEq)]
pub struct LogSpec {
    /// Level for targets without an override
    pub level: LevelFilter,
    /// Target prefix and its level
    pub targets: Vec<(String, LevelFilter)>,
}

fn parse_level(name: &str) -> Result<LevelFilter> {
    name.parse().map_err(|_| anyhow!("invalid log level: {}", name))
}

/// Parse a [`LogSpec`].  The default level is optional and falls back to `info`.
pub fn parse_log_spec(spec: &str) -> Result<LogSpec> {
    let mut log_spec = LogSpec { level: LevelFilter::Info, targets: Vec::new() };
    for (i, part) in spec.split(',').map(str::trim).enumerate() {
        match part.split_once('=') {
            Some((target, level)) if !target.is_empty() =>
                log_spec.targets.push((target.to_string(), parse_level(level)?)),
            Some(_) => return Err(anyhow!("missing log target in {:?}", part)),
            None if i == 0 => log_spec.level = parse_level(part)?,
            None => return Err(anyhow!("default log level must come first: {:?}", spec)),
        }
    }
    Ok(log_spec)
}

/// Log to stderr at `spec`, or at `RUST_LOG` if that is set
#[cfg(feature = "main")]
pub fn setup_logging(who: &str, spec: &LogSpec) -> Result<()> {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new().info(Color::Green).error(Color::Red).warn(Color::Yellow);
    let spec = match env::var("RUST_LOG") {
        Ok(env_spec) => parse_log_spec(&env_spec)?,
        Err(_) => spec.clone(),
    };
    let who = who.to_string();
    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}/{} {}] {}",
                tstamp(),
                who,
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(spec.level)
        .level_for("jsonrpc_async", LevelFilter::Info);
    for (target, level) in spec.targets {
        dispatch = dispatch.level_for(target, level);
    }
    dispatch.chain(std::io::stderr()).apply()?;
    Ok(())
}

// Would prefer to use now_local but https://rustsec.org/advisories/RUSTSEC-2020-0071
#[cfg(feature = "main")]
fn tstamp() -> String {
    use time::{macros::format_description, OffsetDateTime};

    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .unwrap_or_default()
}
