//! Live system readings
//!
//! Every reader returns `None` when the value is unavailable; panels draw a
//! placeholder instead. Parsing is split into pure functions so it can be
//! tested off-device.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::process::Command;

use log::debug;

/// Interfaces searched for an address, in order
pub const INTERFACES: [&str; 2] = ["wlan0", "eth0"];

/// Wireless interface
pub const WIRELESS: &str = "wlan0";

/// Busy and total jiffies from the aggregate `cpu` line of `/proc/stat`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuTimes {
    /// Jiffies not spent idle or waiting on IO
    pub busy: u64,
    /// All jiffies
    pub total: u64,
}

/// Throttling state decoded from `vcgencmd get_throttled`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle(pub u32);

impl Throttle {
    const CURRENT: [(u32, &'static str); 4] = [
        (0, "Under-voltage"),
        (1, "Freq capped"),
        (2, "Throttled"),
        (3, "Soft temp limit"),
    ];

    const BOOT: [(u32, &'static str); 4] = [
        (16, "Under-volt (boot)"),
        (17, "Freq cap (boot)"),
        (18, "Throttled (boot)"),
        (19, "Soft limit (boot)"),
    ];

    fn names(self, table: &[(u32, &'static str)]) -> Vec<&'static str> {
        table
            .iter()
            .filter(|(bit, _)| self.0 & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect()
    }

    /// Conditions active right now (bits 0-3)
    pub fn current(self) -> Vec<&'static str> {
        self.names(&Self::CURRENT)
    }

    /// Conditions seen since boot (bits 16-19)
    pub fn since_boot(self) -> Vec<&'static str> {
        self.names(&Self::BOOT)
    }
}

fn read_trimmed(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => Some(text.trim().to_owned()),
        Err(e) => {
            debug!("Cannot read {}: {e}", path.display());
            None
        }
    }
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_owned())
        }
        Ok(output) => {
            debug!("{program} exited with {}", output.status);
            None
        }
        Err(e) => {
            debug!("Cannot run {program}: {e}");
            None
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Kernel host name
pub fn hostname() -> Option<String> {
    read_trimmed("/proc/sys/kernel/hostname")
        .or_else(|| read_trimmed("/etc/hostname"))
        .and_then(non_empty)
}

/// Seconds since boot
pub fn uptime_secs() -> Option<u64> {
    parse_uptime(&read_trimmed("/proc/uptime")?)
}

/// First field of `/proc/uptime`, truncated to whole seconds
pub fn parse_uptime(text: &str) -> Option<u64> {
    let secs: f64 = text.split_whitespace().next()?.parse().ok()?;
    (secs >= 0.0).then_some(secs as u64)
}

/// `Up: 2d 3h 4m`, or `Up: 3h 4m` under a day
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let mins = secs % 3_600 / 60;
    if days > 0 {
        format!("Up: {days}d {hours}h {mins}m")
    } else {
        format!("Up: {hours}h {mins}m")
    }
}

/// SoC temperature in °C
pub fn cpu_temp_c() -> Option<f32> {
    read_trimmed("/sys/class/thermal/thermal_zone0/temp")
        .and_then(|raw| parse_millidegrees(&raw))
        .or_else(|| parse_vcgencmd_temp(&command_output("vcgencmd", &["measure_temp"])?))
}

/// Millidegree reading from the thermal zone
pub fn parse_millidegrees(text: &str) -> Option<f32> {
    let milli: i32 = text.trim().parse().ok()?;
    Some(milli as f32 / 1000.0)
}

/// `temp=48.3'C`
pub fn parse_vcgencmd_temp(text: &str) -> Option<f32> {
    let (_, value) = text.trim().split_once('=')?;
    value.trim_end_matches("'C").parse().ok()
}

/// Aggregate CPU counters
pub fn cpu_times() -> Option<CpuTimes> {
    parse_cpu_times(&read_trimmed("/proc/stat")?)
}

/// Parse the `cpu ` summary line of `/proc/stat`
pub fn parse_cpu_times(text: &str) -> Option<CpuTimes> {
    let line = text.lines().find(|line| line.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if fields.len() < 4 {
        return None;
    }
    let total: u64 = fields.iter().sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes {
        busy: total.saturating_sub(idle),
        total,
    })
}

/// Busy share between two samples, or since boot without an earlier one
pub fn cpu_percent(previous: Option<CpuTimes>, current: CpuTimes) -> f32 {
    let (busy, total) = match previous {
        Some(prev) if current.total > prev.total => (
            current.busy.saturating_sub(prev.busy),
            current.total - prev.total,
        ),
        _ => (current.busy, current.total),
    };
    if total == 0 {
        return 0.0;
    }
    busy as f32 * 100.0 / total as f32
}

/// Share of RAM in use
pub fn memory_percent() -> Option<f32> {
    parse_meminfo(&read_trimmed("/proc/meminfo")?)
}

/// Used share from `MemTotal` and `MemAvailable`
pub fn parse_meminfo(text: &str) -> Option<f32> {
    let field = |name: &str| -> Option<u64> {
        let line = text.lines().find(|line| line.starts_with(name))?;
        line.split_whitespace().nth(1)?.parse().ok()
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(available) as f32 * 100.0 / total as f32)
}

/// Share of the root filesystem in use
pub fn disk_percent() -> Option<f32> {
    parse_df(&command_output("df", &["-P", "/"])?)
}

/// Capacity column of `df -P` output
pub fn parse_df(text: &str) -> Option<f32> {
    let row = text.lines().nth(1)?;
    let capacity = row.split_whitespace().nth(4)?;
    capacity.trim_end_matches('%').parse().ok()
}

/// 1, 5 and 15 minute load averages
pub fn load_average() -> Option<(f32, f32, f32)> {
    parse_loadavg(&read_trimmed("/proc/loadavg")?)
}

/// First three fields of `/proc/loadavg`
pub fn parse_loadavg(text: &str) -> Option<(f32, f32, f32)> {
    let mut fields = text.split_whitespace().map(str::parse::<f32>);
    let one = fields.next()?.ok()?;
    let five = fields.next()?.ok()?;
    let fifteen = fields.next()?.ok()?;
    Some((one, five, fifteen))
}

/// Number of running processes
pub fn process_count() -> Option<usize> {
    let entries = fs::read_dir("/proc").ok()?;
    Some(
        entries
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()))
            })
            .count(),
    )
}

/// First IPv4 address on wlan0, then eth0
pub fn ipv4_address() -> Option<Ipv4Addr> {
    INTERFACES.iter().find_map(|iface| {
        parse_ip_addr(&command_output("ip", &["-4", "-o", "addr", "show", "dev", iface])?)
    })
}

/// Address from `ip -4 -o addr show` output
pub fn parse_ip_addr(text: &str) -> Option<Ipv4Addr> {
    let mut words = text.split_whitespace();
    words.find(|word| *word == "inet")?;
    let cidr = words.next()?;
    cidr.split('/').next()?.parse().ok()
}

/// Hardware address of the wireless interface
pub fn mac_address() -> Option<String> {
    read_trimmed(format!("/sys/class/net/{WIRELESS}/address")).and_then(non_empty)
}

/// Network name the wireless interface is associated with
pub fn ssid() -> Option<String> {
    command_output("iwgetid", &["-r"]).and_then(non_empty)
}

/// Signal level in dBm
pub fn signal_dbm() -> Option<i32> {
    parse_wireless(&read_trimmed("/proc/net/wireless")?, WIRELESS)
}

/// Level column for `iface` in `/proc/net/wireless`
pub fn parse_wireless(text: &str, iface: &str) -> Option<i32> {
    let line = text
        .lines()
        .find(|line| line.trim_start().starts_with(&format!("{iface}:")))?;
    let level = line.split_whitespace().nth(3)?;
    let level: f32 = level.trim_end_matches('.').parse().ok()?;
    Some(level as i32)
}

/// Channel frequency in MHz
pub fn frequency_mhz() -> Option<u32> {
    parse_iw_link(&command_output("iw", &["dev", WIRELESS, "link"])?)
}

/// `freq:` line of `iw dev <iface> link`
pub fn parse_iw_link(text: &str) -> Option<u32> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("freq:"))?;
    let value: f32 = line.trim_start_matches("freq:").trim().parse().ok()?;
    Some(value as u32)
}

/// Default route
pub fn gateway() -> Option<Ipv4Addr> {
    parse_route(&read_trimmed("/proc/net/route")?)
}

/// Gateway of the `00000000` destination in `/proc/net/route`
///
/// Addresses in that table are little-endian hex.
pub fn parse_route(text: &str) -> Option<Ipv4Addr> {
    text.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.get(1) != Some(&"00000000") {
            return None;
        }
        let raw = u32::from_str_radix(fields.get(2)?, 16).ok()?;
        Some(Ipv4Addr::from(raw.to_le_bytes()))
    })
}

/// First configured name server
pub fn dns_server() -> Option<String> {
    parse_resolv_conf(&read_trimmed("/etc/resolv.conf")?)
}

/// First `nameserver` entry
pub fn parse_resolv_conf(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("nameserver"))
        .find_map(|line| line.split_whitespace().nth(1).map(str::to_owned))
}

/// Open inet sockets
pub fn connection_count() -> Option<usize> {
    let tables = ["/proc/net/tcp", "/proc/net/tcp6", "/proc/net/udp", "/proc/net/udp6"];
    let counts: Vec<usize> = tables
        .iter()
        .filter_map(|path| fs::read_to_string(path).ok())
        .map(|text| count_socket_rows(&text))
        .collect();
    (!counts.is_empty()).then(|| counts.iter().sum())
}

/// Rows under the header of a `/proc/net` socket table
pub fn count_socket_rows(text: &str) -> usize {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .count()
}

/// Current clock of core 0 in MHz
pub fn cpu_freq_mhz() -> Option<u32> {
    let khz: u32 = read_trimmed("/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq")?
        .parse()
        .ok()?;
    Some(khz / 1000)
}

/// Frequency governor of core 0
pub fn governor() -> Option<String> {
    read_trimmed("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor").and_then(non_empty)
}

/// Core voltage, e.g. `0.8500V`
pub fn core_voltage() -> Option<String> {
    parse_vcgencmd_value(&command_output("vcgencmd", &["measure_volts"])?)
}

/// Value after `=` in a `vcgencmd` reply
pub fn parse_vcgencmd_value(text: &str) -> Option<String> {
    let (_, value) = text.trim().split_once('=')?;
    non_empty(value.to_owned())
}

/// Throttling flags
pub fn throttled() -> Option<Throttle> {
    parse_throttled(&command_output("vcgencmd", &["get_throttled"])?)
}

/// `throttled=0x50005`
pub fn parse_throttled(text: &str) -> Option<Throttle> {
    let value = parse_vcgencmd_value(text)?;
    let hex = value.trim_start_matches("0x");
    u32::from_str_radix(hex, 16).ok().map(Throttle)
}
