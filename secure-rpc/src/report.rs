//! Human-readable rendering of service responses.

use std::fmt;

use crate::proto::ContainerInfo;
use crate::proto::ResourceResponse;
use crate::proto::ShellResponse;

impl ShellResponse {
    /// True when the agent reported no error for the command.
    pub fn succeeded(&self) -> bool {
        self.error.is_empty()
    }
}

impl fmt::Display for ShellResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded() {
            return write!(f, "{}", self.output.trim_end());
        }
        write!(f, "error: {}", self.error)?;
        if !self.output.is_empty() {
            write!(f, "\n{}", self.output.trim_end())?;
        }
        Ok(())
    }
}

impl fmt::Display for ResourceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hostname:       {}", self.hostname)?;
        writeln!(f, "os:             {} ({})", self.os, self.kernel_version)?;
        if !self.start_time.is_empty() {
            writeln!(f, "started:        {}", self.start_time)?;
        }
        writeln!(f, "cpu usage:      {:.2}%", self.cpu_usage)?;
        writeln!(f, "memory usage:   {:.2}%", self.memory_usage)?;
        writeln!(f, "swap usage:     {:.2}%", self.swap_usage)?;
        writeln!(f, "disk usage:     {}", self.disk_usage)?;
        writeln!(f, "load average:   {:.2}", self.load_average)?;
        writeln!(
            f,
            "network:        up {:.2} / down {:.2}",
            self.net_upload_speed, self.net_download_speed
        )?;
        let ips = if self.ip_addresses.is_empty() {
            "-".to_string()
        } else {
            self.ip_addresses.join(", ")
        };
        writeln!(f, "ip addresses:   {ips}")?;
        writeln!(f, "webshell:       {}", yes_no(self.webshell_supported))?;
        write!(f, "docker:         {}", yes_no(self.docker_available))?;
        for container in &self.containers {
            write!(f, "\n  {container}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {} cpu {} mem {}",
            self.id, self.name, self.image, self.status, self.cpu_usage, self.memory_usage
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
