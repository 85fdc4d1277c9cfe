//! SDP (Session Description Protocol) codec per RFC 4566.
//!
//! Decoding runs in two stages: [`decode_session`] lexes a byte buffer into
//! typed `<type>=<value>` lines, then [`Decoder`] drives a section-aware
//! ordering state machine over them — session fields, time fields, media
//! blocks — parsing each field's sub-grammar into a [`Message`]. Encoding is
//! symmetric: [`Message::append_to`] renders typed fields back into a
//! [`Session`], which serializes to bytes with `\n` separators.
//!
//! # Example
//! ```
//! use sdp::{decode_session, Decoder, Message};
//!
//! let raw = b"v=0\n\
//!     o=jdoe 2890844526 2890842807 IN IP4 10.47.16.5\n\
//!     s=SDP Seminar\n\
//!     c=IN IP4 224.2.17.12/127\n\
//!     t=2873397496 2873404696\n\
//!     a=recvonly\n\
//!     m=audio 49170 RTP/AVP 0";
//!
//! let session = decode_session(raw, None)?;
//! let mut message = Message::default();
//! Decoder::new(&session).decode(&mut message)?;
//!
//! assert_eq!(message.name, "SDP Seminar");
//! assert!(message.flag("recvonly"));
//! assert_eq!(message.connection.ttl, 127);
//! assert_eq!(message.medias[0].description.port, 49170);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod line;
pub mod parse;
pub mod serialize;
pub mod time;

pub use line::{decode_session, FieldType, Line, LineError, Session};
pub use parse::{DecodeError, DecodeErrorKind, Decoder, Section};
pub use time::{CompactInterval, Interval, NtpTime, NTP_UNIX_DELTA};

use smol_str::SmolStr;
use std::fmt;
use std::net::IpAddr;

/// Parsed SDP message: the session-level fields plus its media sections.
///
/// A `Message` is created empty, filled either by [`Decoder`] or by the
/// caller, and rendered with [`Message::append_to`]. All strings are owned,
/// so the message outlives the buffer it was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Protocol version from `v=`.
    pub version: u32,
    /// Originator and session identifier from `o=`.
    pub origin: Origin,
    /// Session name from `s=`.
    pub name: SmolStr,
    /// Session information from `i=`.
    pub info: Option<SmolStr>,
    /// URI from `u=`.
    pub uri: Option<SmolStr>,
    /// Email contact from `e=`.
    pub email: Option<SmolStr>,
    /// Phone contact from `p=`.
    pub phone: Option<SmolStr>,
    /// Session-level connection data from `c=`.
    pub connection: ConnectionData,
    /// Session-level attributes from `a=` lines.
    pub attributes: Attributes,
    /// Media sections, in wire order.
    pub medias: Vec<Media>,
    /// Session-level encryption key from `k=`.
    pub encryption: Encryption,
    /// Session-level bandwidths from `b=` lines.
    pub bandwidths: Bandwidths,
    /// Time descriptions from `t=` lines with their repeat times.
    pub timings: Vec<Timing>,
    /// Time zone adjustments from `z=`.
    pub tz_adjustments: Vec<TimeZone>,
}

impl Message {
    /// Start of the session, from the first time description.
    pub fn start(&self) -> NtpTime {
        self.timings.first().map(|t| t.start).unwrap_or(NtpTime::ZERO)
    }

    /// End of the session, from the first time description.
    pub fn end(&self) -> NtpTime {
        self.timings.first().map(|t| t.end).unwrap_or(NtpTime::ZERO)
    }

    /// Returns true if the attribute is present (with or without a value).
    pub fn flag(&self, name: &str) -> bool {
        self.attributes.flag(name)
    }

    /// First value of the attribute, or the empty string.
    pub fn attribute(&self, name: &str) -> &str {
        self.attributes.value(name)
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attributes.push(name, value);
    }

    pub fn add_flag(&mut self, name: &str) {
        self.attributes.push(name, "");
    }
}

/// Originator and session identifier, `o=` per RFC 4566 §5.2.
///
/// The address may be a domain name or an IP literal. Empty network and
/// address types render with defaults: `IN`, and `IP4` for an IPv4 literal,
/// `IP6` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub username: SmolStr,
    pub session_id: u64,
    pub session_version: u64,
    pub network_type: SmolStr,
    pub address_type: SmolStr,
    pub address: SmolStr,
}

/// Connection data, `c=` per RFC 4566 §5.7.
///
/// Wire form `<nettype> <addrtype> <base-address>[/<ttl>][/<count>]`; a TTL
/// sub-field is only meaningful for IPv4. Zero `ttl`/`addresses` mean the
/// sub-field is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionData {
    pub network_type: SmolStr,
    pub address_type: SmolStr,
    pub ip: Option<IpAddr>,
    pub ttl: u8,
    pub addresses: u8,
}

impl ConnectionData {
    pub fn from_ip(ip: IpAddr) -> ConnectionData {
        ConnectionData {
            ip: Some(ip),
            ..ConnectionData::default()
        }
    }

    /// True when no field is set.
    pub fn blank(&self) -> bool {
        *self == ConnectionData::default()
    }
}

/// One time description: a `t=` line and any `r=` repeat lines under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timing {
    pub start: NtpTime,
    pub end: NtpTime,
    pub repeat: Interval,
    pub active: Interval,
    pub offsets: Vec<Interval>,
}

/// One `z=` adjustment pair: when the shift happens and by how much.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeZone {
    pub start: NtpTime,
    pub offset: Interval,
}

/// Encryption key, `k=` per RFC 4566 §5.12. May be method-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encryption {
    pub method: SmolStr,
    pub key: SmolStr,
}

impl Encryption {
    pub fn blank(&self) -> bool {
        self.method.is_empty() && self.key.is_empty()
    }
}

/// The `m=` line proper: `<media> <port>[/<count>] <proto> <fmt> ...`.
///
/// A zero `ports_number` means the `/<count>` sub-field is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDescription {
    pub kind: SmolStr,
    pub port: u16,
    pub ports_number: u16,
    pub protocol: SmolStr,
    pub formats: Vec<SmolStr>,
}

/// One media section: its `m=` description and the dependent fields that
/// followed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
    /// Media title from an `i=` line inside the section.
    pub title: Option<SmolStr>,
    pub description: MediaDescription,
    pub connection: ConnectionData,
    pub attributes: Attributes,
    pub encryption: Encryption,
    pub bandwidths: Bandwidths,
}

impl Media {
    /// Returns true if the attribute is present (with or without a value).
    pub fn flag(&self, name: &str) -> bool {
        self.attributes.flag(name)
    }

    /// First value of the attribute, or the empty string.
    pub fn attribute(&self, name: &str) -> &str {
        self.attributes.value(name)
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attributes.push(name, value);
    }

    pub fn add_flag(&mut self, name: &str) {
        self.attributes.push(name, "");
    }

    /// Payload format for an RTP payload type, looked up in the `rtpmap`
    /// attributes. The payload type must match the whole leading token;
    /// returns the trimmed remainder, or the empty string if unmapped.
    ///
    /// See RFC 4566 §6: `a=rtpmap:<payload type> <encoding>/<clock rate>`.
    pub fn payload_format(&self, payload_type: &str) -> &str {
        for value in self.attributes.values("rtpmap") {
            if let Some(rest) = value.strip_prefix(payload_type) {
                if rest.is_empty() || rest.starts_with(' ') {
                    return rest.trim();
                }
            }
        }
        ""
    }
}

/// Attribute list with map-style accessors.
///
/// Keys may repeat (`rtpmap` commonly does); every occurrence is kept, in
/// insertion order, across all keys. A flag attribute is stored with an
/// empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(SmolStr, SmolStr)>,
}

impl Attributes {
    /// First value recorded under `name`, or the empty string.
    pub fn value(&self, name: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Every value recorded under `name`, in insertion order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns true if at least one occurrence of `name` is present.
    pub fn flag(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.pairs.push((SmolStr::new(name), SmolStr::new(value)));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (SmolStr, SmolStr)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Bandwidth type token of a `b=` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandwidthType {
    /// `CT`, conference total.
    ConferenceTotal,
    /// `AS`, application specific.
    ApplicationSpecific,
}

impl BandwidthType {
    pub fn as_str(self) -> &'static str {
        match self {
            BandwidthType::ConferenceTotal => "CT",
            BandwidthType::ApplicationSpecific => "AS",
        }
    }

    pub fn from_token(token: &str) -> Option<BandwidthType> {
        match token {
            "CT" => Some(BandwidthType::ConferenceTotal),
            "AS" => Some(BandwidthType::ApplicationSpecific),
            _ => None,
        }
    }
}

impl fmt::Display for BandwidthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bandwidths keyed by type, in kilobits per second.
///
/// Setting an existing key overwrites its value in place, so iteration is
/// deterministic in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bandwidths {
    entries: Vec<(BandwidthType, u32)>,
}

impl Bandwidths {
    pub fn set(&mut self, kind: BandwidthType, value: u32) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((kind, value)),
        }
    }

    pub fn get(&self, kind: BandwidthType) -> Option<u32> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (BandwidthType, u32)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_multiplicity_in_order() {
        let mut attrs = Attributes::default();
        attrs.push("rtpmap", "96 L8/8000");
        attrs.push("orient", "landscape");
        attrs.push("rtpmap", "99 h263-1998/90000");

        assert_eq!(attrs.values("rtpmap"), vec!["96 L8/8000", "99 h263-1998/90000"]);
        assert_eq!(attrs.value("rtpmap"), "96 L8/8000");
        assert_eq!(attrs.value("missing"), "");
        assert_eq!(attrs.len(), 3);
    }

    #[test]
    fn flag_means_present() {
        let mut message = Message::default();
        message.add_flag("recvonly");
        message.add_attribute("orient", "landscape");

        assert!(message.flag("recvonly"));
        assert!(message.flag("orient"));
        assert!(!message.flag("sendonly"));
        assert_eq!(message.attribute("recvonly"), "");
    }

    #[test]
    fn payload_format_matches_whole_token() {
        let mut media = Media::default();
        media.add_attribute("rtpmap", "99 h263-1998/90000");

        assert_eq!(media.payload_format("99"), "h263-1998/90000");
        assert_eq!(media.payload_format("9"), "");
        assert_eq!(media.payload_format("0"), "");
    }

    #[test]
    fn start_and_end_come_from_first_timing() {
        let mut message = Message::default();
        assert_eq!(message.start(), NtpTime::ZERO);
        assert_eq!(message.end(), NtpTime::ZERO);

        message.timings.push(Timing {
            start: NtpTime::from_secs(2_873_397_496),
            end: NtpTime::from_secs(2_873_404_696),
            ..Timing::default()
        });
        assert_eq!(message.start().as_secs(), 2_873_397_496);
        assert_eq!(message.end().as_secs(), 2_873_404_696);
    }

    #[test]
    fn blank_predicates() {
        assert!(ConnectionData::default().blank());
        assert!(!ConnectionData::from_ip("224.2.17.12".parse().unwrap()).blank());
        assert!(Encryption::default().blank());
        assert!(!Encryption { method: "prompt".into(), key: "".into() }.blank());
    }

    #[test]
    fn bandwidths_overwrite_by_type() {
        let mut bw = Bandwidths::default();
        bw.set(BandwidthType::ConferenceTotal, 154_798);
        bw.set(BandwidthType::ApplicationSpecific, 66_781);
        bw.set(BandwidthType::ConferenceTotal, 200_000);

        assert_eq!(bw.len(), 2);
        assert_eq!(bw.get(BandwidthType::ConferenceTotal), Some(200_000));
        let order: Vec<_> = bw.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            order,
            vec![BandwidthType::ConferenceTotal, BandwidthType::ApplicationSpecific]
        );
    }
}
