//! Parsing helpers for environment values.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Parse a positive integer.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_positive<T>(field: &'static str, value: &str) -> ConfigResult<T>
where
    T: FromStr + PartialOrd + Default,
{
    let parsed = value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(field, value, "not_an_integer"))?;
    if parsed <= T::default() {
        return Err(ConfigError::invalid(field, value, "must_be_positive"));
    }
    Ok(parsed)
}

/// Parse a positive integer no larger than `max`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric, zero, or oversized values.
pub fn parse_bounded(field: &'static str, value: &str, max: usize) -> ConfigResult<usize> {
    let parsed = parse_positive::<usize>(field, value)?;
    if parsed > max {
        return Err(ConfigError::invalid(field, value, "exceeds_maximum"));
    }
    Ok(parsed)
}

/// Parse a whole number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_seconds(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_positive::<u64>(field, value).map(Duration::from_secs)
}

/// Parse a TCP port.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not in `1..=65535`.
pub fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ConfigError::invalid(field, value, "must_be_between_1_and_65535"))
}

/// Combine a host and port into a listener address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the host is not an IP address.
pub fn parse_bind_addr(field: &'static str, host: &str, port: u16) -> ConfigResult<SocketAddr> {
    let ip = host
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid(field, host, "not_an_ip_address"))?;
    Ok(SocketAddr::new(ip, port))
}
