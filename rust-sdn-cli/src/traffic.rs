//! Synthetic traffic for benchmarks and evaluations.
//!
//! Hosts live in 10.0.0.0/24; clients use ephemeral source ports.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rust_sdn_common::{Packet, Protocol};
use std::net::Ipv4Addr;

/// NFS server that produces the backup pattern.
pub const BACKUP_SERVER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 10);
pub const NFS_PORT: u16 = 2049;

/// Named traffic mixes used by `evaluate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficPattern {
    /// 70% web (80/443), 30% well-known-port noise.
    WebHeavy,
    /// Even spread over common service ports.
    Mixed,
    /// Large NFS transfers from a single backup server.
    Backup,
}

impl TrafficPattern {
    pub const ALL: [TrafficPattern; 3] = [
        TrafficPattern::WebHeavy,
        TrafficPattern::Mixed,
        TrafficPattern::Backup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrafficPattern::WebHeavy => "web_heavy",
            TrafficPattern::Mixed => "mixed",
            TrafficPattern::Backup => "backup",
        }
    }
}

pub struct TrafficGenerator {
    rng: StdRng,
}

impl TrafficGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn host(&mut self) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, self.rng.gen_range(1..=254))
    }

    fn ephemeral_port(&mut self) -> u16 {
        self.rng.gen_range(1024..=65535)
    }

    fn packet(&mut self, dst_port: u16, protocol: Protocol) -> Packet {
        let src_ip = self.host();
        let dst_ip = self.host();
        let src_port = self.ephemeral_port();
        Packet::flow(src_ip, dst_ip, src_port, dst_port, protocol)
    }

    fn tcp_or_udp(&mut self) -> Protocol {
        if self.rng.gen_bool(0.5) {
            Protocol::Tcp
        } else {
            Protocol::Udp
        }
    }

    /// Benchmark mix: 40% HTTP, 30% HTTPS, 20% DNS, 10% other well-known ports.
    ///
    /// Each share is rounded down, so the result may be a few packets short
    /// of `count`.
    pub fn benchmark_mix(&mut self, count: usize) -> Vec<Packet> {
        let share = |pct: usize| count * pct / 100;
        let mut traffic = Vec::with_capacity(count);

        for _ in 0..share(40) {
            traffic.push(self.packet(80, Protocol::Tcp));
        }
        for _ in 0..share(30) {
            traffic.push(self.packet(443, Protocol::Tcp));
        }
        for _ in 0..share(20) {
            traffic.push(self.packet(53, Protocol::Udp));
        }
        for _ in 0..share(10) {
            let port = self.rng.gen_range(1..=1023);
            let protocol = self.tcp_or_udp();
            traffic.push(self.packet(port, protocol));
        }

        traffic
    }

    pub fn pattern(&mut self, pattern: TrafficPattern) -> Vec<Packet> {
        match pattern {
            TrafficPattern::WebHeavy => self.web_heavy(),
            TrafficPattern::Mixed => self.mixed(),
            TrafficPattern::Backup => self.backup(),
        }
    }

    fn web_heavy(&mut self) -> Vec<Packet> {
        let mut traffic = Vec::with_capacity(1000);
        for _ in 0..700 {
            let port = *[80u16, 443].choose(&mut self.rng).unwrap_or(&80);
            traffic.push(self.packet(port, Protocol::Tcp));
        }
        for _ in 0..300 {
            let port = self.rng.gen_range(1..=1023);
            let protocol = self.tcp_or_udp();
            traffic.push(self.packet(port, protocol));
        }
        traffic
    }

    fn mixed(&mut self) -> Vec<Packet> {
        const TCP_SERVICES: [u16; 4] = [80, 443, 22, 25];

        (0..1000)
            .map(|_| {
                let port = match self.rng.gen_range(0..6) {
                    0 => 80,
                    1 => 443,
                    2 => 22,
                    3 => 25,
                    4 => 53,
                    _ => self.rng.gen_range(1..=1023),
                };
                let protocol = if TCP_SERVICES.contains(&port) {
                    Protocol::Tcp
                } else {
                    Protocol::Udp
                };
                self.packet(port, protocol)
            })
            .collect()
    }

    fn backup(&mut self) -> Vec<Packet> {
        (0..1000)
            .map(|_| {
                let dst_ip = self.host();
                let dst_port = self.ephemeral_port();
                let size = self.rng.gen_range(1..=1500u32) * 1024;
                Packet::flow(BACKUP_SERVER, dst_ip, NFS_PORT, dst_port, Protocol::Tcp)
                    .with_size(size)
            })
            .collect()
    }
}
