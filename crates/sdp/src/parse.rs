// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Semantic decoder implementing RFC 4566 field ordering.
//!
//! [`Decoder`] walks a lexed [`Session`] with a `(section, position)` cursor.
//! Each section — session, time, media — has an ordered template of expected
//! field letters with their cardinalities; section transitions are detected
//! from the next field letter alone, rewinding one line and re-entering the
//! sub-decoder for the new section. Field values are parsed by per-letter
//! micro-grammars into a [`Message`].
//!
//! Malformed input always surfaces as a [`DecodeError`] naming the section,
//! field, and line. Panics are reserved for states unreachable from input.

use smol_str::SmolStr;
use std::fmt;
use std::net::IpAddr;

use crate::line::{FieldType, Session};
use crate::time::{Interval, NtpTime};
use crate::{
    BandwidthType, Encryption, Media, MediaDescription, Message, Origin, TimeZone,
    Timing,
};

/// Section of an SDP message the decoder is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Session-level fields (`v=` through `a=`).
    Session,
    /// A time description (`t=` and its `r=` lines).
    Time,
    /// A media description (`m=` and its dependent fields).
    Media,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Session => f.write_str("s"),
            Section::Time => f.write_str("t"),
            Section::Media => f.write_str("m"),
        }
    }
}

/// Decode failure: where it happened and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    place: String,
    kind: DecodeErrorKind,
}

impl DecodeError {
    /// Human-readable `"<section>/<field> at line N"` location.
    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.place, self.kind)
    }
}

impl std::error::Error for DecodeError {}

/// Taxonomy of decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Field ordering violation.
    UnexpectedField {
        field: FieldType,
        section: Section,
        pos: usize,
    },
    /// Wrong number of space-separated sub-fields.
    SubFieldCount {
        expected: &'static str,
        found: usize,
    },
    /// Integer, NTP timestamp, byte, or typed-time parse failure.
    NumberParse { value: String },
    /// `b=` type outside `CT`/`AS`.
    BadBandwidthType { value: String },
    /// `b=` or `k=` missing a required value.
    EmptyValue { what: &'static str },
    /// Malformed connection address shape.
    ConnectionShape { reason: &'static str },
    /// Unparseable IP literal.
    IpParse { value: String },
    /// Odd number of sub-fields in `z=`.
    TimeZoneParity { found: usize },
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::UnexpectedField { field, section, pos } => write!(
                f,
                "field {} is unexpected in section {} at position {}",
                field, section, pos
            ),
            DecodeErrorKind::SubFieldCount { expected, found } => {
                write!(f, "unexpected sub-field count {}, expected {}", found, expected)
            }
            DecodeErrorKind::NumberParse { value } => {
                write!(f, "cannot parse number from {:?}", value)
            }
            DecodeErrorKind::BadBandwidthType { value } => {
                write!(f, "bad bandwidth type {:?}", value)
            }
            DecodeErrorKind::EmptyValue { what } => {
                write!(f, "no value specified for {}", what)
            }
            DecodeErrorKind::ConnectionShape { reason } => f.write_str(reason),
            DecodeErrorKind::IpParse { value } => {
                write!(f, "cannot parse IP address {:?}", value)
            }
            DecodeErrorKind::TimeZoneParity { found } => {
                write!(f, "odd sub-field count {} in time zone adjustments", found)
            }
        }
    }
}

/// Ordered template of field letters expected in the session section.
/// Positions 0..11; position 10 (`k=`) starts the after-time region.
const SESSION_ORDER: [FieldType; 12] = [
    FieldType::Version,
    FieldType::Origin,
    FieldType::SessionName,
    FieldType::SessionInfo,
    FieldType::Uri,
    FieldType::Email,
    FieldType::Phone,
    FieldType::Connection,
    FieldType::Bandwidth,
    FieldType::TimeZones,
    FieldType::EncryptionKey,
    FieldType::Attribute,
];

/// Session position a time section hands control back to.
const AFTER_TIME: usize = 10;

const TIME_ORDER: [FieldType; 2] = [FieldType::Timing, FieldType::RepeatTimes];

const MEDIA_ORDER: [FieldType; 6] = [
    FieldType::Media,
    FieldType::SessionInfo,
    FieldType::Connection,
    FieldType::Bandwidth,
    FieldType::EncryptionKey,
    FieldType::Attribute,
];

fn ordering(section: Section) -> &'static [FieldType] {
    match section {
        Section::Session => &SESSION_ORDER,
        Section::Time => &TIME_ORDER,
        Section::Media => &MEDIA_ORDER,
    }
}

fn is_optional(field: FieldType) -> bool {
    !matches!(
        field,
        FieldType::Version
            | FieldType::Origin
            | FieldType::SessionName
            | FieldType::Timing
            | FieldType::Media
    )
}

/// Zero-or-more fields never advance the position cursor.
fn is_zero_or_more(field: FieldType) -> bool {
    matches!(
        field,
        FieldType::Bandwidth | FieldType::Attribute | FieldType::RepeatTimes
    )
}

/// Scans the template from `pos`, skipping optional and zero-or-more
/// entries; a differing required entry stops the scan.
fn expected_in(order: &[FieldType], pos: usize, field: FieldType) -> bool {
    for &expected in order.iter().skip(pos) {
        if expected == field {
            return true;
        }
        if is_optional(expected) || is_zero_or_more(expected) {
            continue;
        }
        return false;
    }
    false
}

/// Whether `field` is acceptable at `pos` in `section`, either directly in
/// the section's template or through a permitted section transition.
fn is_expected(field: FieldType, section: Section, pos: usize) -> bool {
    if expected_in(ordering(section), pos, field) {
        return true;
    }
    match section {
        Section::Session => {
            (pos < AFTER_TIME && is_expected(field, Section::Time, 0))
                || is_expected(field, Section::Media, 0)
        }
        Section::Time => {
            is_expected(field, Section::Session, AFTER_TIME)
                || is_expected(field, Section::Media, 0)
                // re-entry: the next time description
                || (pos != 0 && is_expected(field, Section::Time, 0))
        }
        // re-entry: the next media description
        Section::Media => pos != 0 && is_expected(field, Section::Media, 0),
    }
}

/// Decodes a [`Message`] from a lexed [`Session`].
///
/// The decoder owns a scratch media accumulator while running; the session
/// is only read. One decoder decodes one message.
pub struct Decoder<'s, 'a> {
    session: &'s Session<'a>,
    pos: usize,
    field: FieldType,
    value: &'s [u8],
    section: Section,
    s_pos: usize,
    media: Media,
}

impl<'s, 'a> Decoder<'s, 'a> {
    pub fn new(session: &'s Session<'a>) -> Decoder<'s, 'a> {
        Decoder {
            session,
            pos: 0,
            field: FieldType::Version,
            value: &[],
            section: Section::Session,
            s_pos: 0,
            media: Media::default(),
        }
    }

    /// Decodes the session into `message`, consuming the decoder.
    pub fn decode(mut self, message: &mut Message) -> Result<(), DecodeError> {
        self.decode_session_section(message)
    }

    fn next(&mut self) -> bool {
        match self.session.get(self.pos) {
            Some(line) => {
                self.field = line.kind;
                self.value = line.value.as_ref();
                self.pos += 1;
                true
            }
            None => false,
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            place: format!("{}/{} at line {}", self.section, self.field, self.pos),
            kind,
        }
    }

    fn check_expected(&self) -> Result<(), DecodeError> {
        if is_expected(self.field, self.section, self.s_pos) {
            Ok(())
        } else {
            Err(self.error(DecodeErrorKind::UnexpectedField {
                field: self.field,
                section: self.section,
                pos: self.s_pos,
            }))
        }
    }

    fn decode_session_section(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        self.s_pos = 0;
        self.section = Section::Session;
        while self.next() {
            self.check_expected()?;
            if !is_zero_or_more(self.field) {
                self.s_pos += 1;
            }
            match self.field {
                FieldType::Timing => {
                    self.pos -= 1;
                    let saved = self.s_pos;
                    self.decode_time_section(m)?;
                    self.s_pos = saved;
                    self.section = Section::Session;
                }
                FieldType::Media => {
                    self.pos -= 1;
                    let saved = self.s_pos;
                    self.decode_media_section(m)?;
                    self.s_pos = saved;
                    self.section = Section::Session;
                }
                _ => self.decode_field(m)?,
            }
        }
        Ok(())
    }

    fn decode_time_section(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        self.s_pos = 0;
        self.section = Section::Time;
        while self.next() {
            self.check_expected()?;
            if self.field == FieldType::Timing && self.s_pos != 0 {
                // next time description; the session loop re-enters
                self.pos -= 1;
                return Ok(());
            }
            if !is_zero_or_more(self.field) {
                self.s_pos += 1;
            }
            match self.field {
                FieldType::Timing | FieldType::RepeatTimes => self.decode_field(m)?,
                _ => {
                    // switch back to session or on to media
                    self.pos -= 1;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn decode_media_section(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        self.s_pos = 0;
        self.section = Section::Media;
        self.media = Media::default();
        while self.next() {
            self.check_expected()?;
            if self.field == FieldType::Media && self.s_pos != 0 {
                // next media description; the session loop re-enters
                self.pos -= 1;
                break;
            }
            if !is_zero_or_more(self.field) {
                self.s_pos += 1;
            }
            self.decode_field(m)?;
        }
        m.medias.push(std::mem::take(&mut self.media));
        Ok(())
    }

    fn decode_field(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        match self.field {
            FieldType::Version => self.decode_version(m),
            FieldType::Origin => self.decode_origin(m),
            FieldType::SessionName => {
                m.name = smol(self.value);
                Ok(())
            }
            FieldType::SessionInfo => {
                if self.section == Section::Media {
                    self.media.title = Some(smol(self.value));
                } else {
                    m.info = Some(smol(self.value));
                }
                Ok(())
            }
            FieldType::Uri => {
                m.uri = Some(smol(self.value));
                Ok(())
            }
            FieldType::Email => {
                m.email = Some(smol(self.value));
                Ok(())
            }
            FieldType::Phone => {
                m.phone = Some(smol(self.value));
                Ok(())
            }
            FieldType::Connection => self.decode_connection_data(m),
            FieldType::Bandwidth => self.decode_bandwidth(m),
            FieldType::Timing => self.decode_timing_field(m),
            FieldType::RepeatTimes => self.decode_repeat_times(m),
            FieldType::TimeZones => self.decode_time_zones(m),
            FieldType::EncryptionKey => self.decode_encryption(m),
            FieldType::Attribute => self.decode_attribute(m),
            FieldType::Media => self.decode_media_description(),
            FieldType::Other(_) => unreachable!("field type rejected by the ordering machine"),
        }
    }

    fn decode_version(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        m.version = self.parse_num(self.value)?;
        Ok(())
    }

    fn decode_origin(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        // o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>
        let parts = subfields(self.value);
        if parts.len() != 6 {
            return Err(self.error(DecodeErrorKind::SubFieldCount {
                expected: "6",
                found: parts.len(),
            }));
        }
        m.origin = Origin {
            username: smol(parts[0]),
            session_id: self.parse_num(parts[1])?,
            session_version: self.parse_num(parts[2])?,
            network_type: smol(parts[3]),
            address_type: smol(parts[4]),
            address: smol(parts[5]),
        };
        Ok(())
    }

    fn decode_connection_data(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        // c=<nettype> <addrtype> <base-address>[/<ttl>][/<count>]
        let parts = subfields(self.value);
        if parts.len() != 3 {
            return Err(self.error(DecodeErrorKind::SubFieldCount {
                expected: "3",
                found: parts.len(),
            }));
        }
        let (net_type, addr_type, conn_addr) = (parts[0], parts[1], parts[2]);
        if net_type.is_empty() {
            return Err(self.error(DecodeErrorKind::ConnectionShape { reason: "nettype is empty" }));
        }
        if addr_type.is_empty() {
            return Err(self.error(DecodeErrorKind::ConnectionShape { reason: "addrtype is empty" }));
        }
        if conn_addr.is_empty() {
            return Err(self.error(DecodeErrorKind::ConnectionShape {
                reason: "connection-address is empty",
            }));
        }

        let address: Vec<&[u8]> = conn_addr.split(|&b| b == b'/').collect();
        if address.len() > 3 {
            return Err(self.error(DecodeErrorKind::ConnectionShape {
                reason: "unexpected fourth element in address",
            }));
        }
        let base = address[0];
        let ip: IpAddr = match std::str::from_utf8(base).ok().and_then(|s| s.parse().ok()) {
            Some(ip) => ip,
            None => return Err(self.error(DecodeErrorKind::IpParse { value: lossy(base) })),
        };

        let mut ttl = 0u8;
        let mut addresses = 0u8;
        match address.len() {
            3 => {
                if !ip.is_ipv4() {
                    return Err(self.error(DecodeErrorKind::ConnectionShape {
                        reason: "unexpected TTL for IPv6",
                    }));
                }
                ttl = self.parse_num(address[1])?;
                addresses = self.parse_num(address[2])?;
            }
            2 => {
                if ip.is_ipv4() {
                    ttl = self.parse_num(address[1])?;
                } else {
                    addresses = self.parse_num(address[1])?;
                }
            }
            _ => {}
        }

        // TTL and address count always land on the section being decoded.
        let connection = if self.section == Section::Media {
            &mut self.media.connection
        } else {
            &mut m.connection
        };
        connection.network_type = smol(net_type);
        connection.address_type = smol(addr_type);
        connection.ip = Some(ip);
        connection.ttl = ttl;
        connection.addresses = addresses;
        Ok(())
    }

    fn decode_bandwidth(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        let (key, value) = split_kv(self.value);
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => return Err(self.error(DecodeErrorKind::EmptyValue { what: "bandwidth" })),
        };
        let kind = match BandwidthType::from_token(String::from_utf8_lossy(key).as_ref()) {
            Some(kind) => kind,
            None => {
                return Err(self.error(DecodeErrorKind::BadBandwidthType { value: lossy(key) }))
            }
        };
        let amount: u32 = self.parse_num(value)?;
        let bandwidths = if self.section == Section::Media {
            &mut self.media.bandwidths
        } else {
            &mut m.bandwidths
        };
        bandwidths.set(kind, amount);
        Ok(())
    }

    fn decode_timing_field(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        // t=<start-time> <stop-time>, both NTP-64
        let parts = subfields(self.value);
        if parts.len() != 2 {
            return Err(self.error(DecodeErrorKind::SubFieldCount {
                expected: "2",
                found: parts.len(),
            }));
        }
        let start = NtpTime::from_secs(self.parse_num(parts[0])?);
        let end = NtpTime::from_secs(self.parse_num(parts[1])?);
        m.timings.push(Timing {
            start,
            end,
            ..Timing::default()
        });
        Ok(())
    }

    fn decode_repeat_times(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        // r=<repeat interval> <active duration> <offsets from start-time>...
        assert!(!m.timings.is_empty(), "repeat times before any timing");
        let parts = subfields(self.value);
        if parts.len() < 3 {
            return Err(self.error(DecodeErrorKind::SubFieldCount {
                expected: "at least 3",
                found: parts.len(),
            }));
        }
        let repeat = self.parse_interval(parts[0])?;
        let active = self.parse_interval(parts[1])?;
        let mut offsets = Vec::with_capacity(parts.len() - 2);
        for part in &parts[2..] {
            offsets.push(self.parse_interval(part)?);
        }
        let timing = m.timings.last_mut().expect("checked above");
        timing.repeat = repeat;
        timing.active = active;
        timing.offsets.extend(offsets);
        Ok(())
    }

    fn decode_time_zones(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        // z=<adjustment time> <offset> <adjustment time> <offset> ...
        let parts = subfields(self.value);
        if parts.len() % 2 != 0 {
            return Err(self.error(DecodeErrorKind::TimeZoneParity { found: parts.len() }));
        }
        for pair in parts.chunks_exact(2) {
            let start = NtpTime::from_secs(self.parse_num(pair[0])?);
            let offset = self.parse_interval(pair[1])?;
            m.tz_adjustments.push(TimeZone { start, offset });
        }
        Ok(())
    }

    fn decode_encryption(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        let (key, value) = split_kv(self.value);
        if let Some(v) = value {
            // an empty key is only valid in the method-only form, `k=prompt`
            if v.is_empty() {
                return Err(self.error(DecodeErrorKind::EmptyValue { what: "encryption key" }));
            }
        }
        let encryption = Encryption {
            method: smol(key),
            key: value.map(smol).unwrap_or_default(),
        };
        if self.section == Section::Media {
            self.media.encryption = encryption;
        } else {
            m.encryption = encryption;
        }
        Ok(())
    }

    fn decode_attribute(&mut self, m: &mut Message) -> Result<(), DecodeError> {
        let (key, value) = split_kv(self.value);
        let key = smol(key);
        let value = value.map(smol).unwrap_or_default();
        let attributes = if self.section == Section::Media {
            &mut self.media.attributes
        } else {
            &mut m.attributes
        };
        attributes.push(key.as_str(), value.as_str());
        Ok(())
    }

    fn decode_media_description(&mut self) -> Result<(), DecodeError> {
        // m=<media> <port>[/<count>] <proto> <fmt> ...
        let parts = subfields(self.value);
        if parts.len() < 4 {
            return Err(self.error(DecodeErrorKind::SubFieldCount {
                expected: "at least 4",
                found: parts.len(),
            }));
        }
        let mut description = MediaDescription {
            kind: smol(parts[0]),
            protocol: smol(parts[2]),
            formats: parts[3..].iter().map(|p| smol(p)).collect(),
            ..MediaDescription::default()
        };
        let port: Vec<&[u8]> = parts[1].split(|&b| b == b'/').collect();
        description.port = self.parse_num(port[0])?;
        if port.len() > 1 {
            description.ports_number = self.parse_num(port[1])?;
        }
        self.media.description = description;
        Ok(())
    }

    fn parse_num<T: std::str::FromStr>(&self, v: &[u8]) -> Result<T, DecodeError> {
        std::str::from_utf8(v)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.error(DecodeErrorKind::NumberParse { value: lossy(v) }))
    }

    fn parse_interval(&self, v: &[u8]) -> Result<Interval, DecodeError> {
        Interval::parse(v)
            .ok_or_else(|| self.error(DecodeErrorKind::NumberParse { value: lossy(v) }))
    }
}

fn subfields(v: &[u8]) -> Vec<&[u8]> {
    v.split(|&b| b == b' ').collect()
}

/// Splits `k:v`; the second element distinguishes a missing `:` from an
/// empty value after one.
fn split_kv(v: &[u8]) -> (&[u8], Option<&[u8]>) {
    match v.iter().position(|&b| b == b':') {
        Some(i) => (&v[..i], Some(&v[i + 1..])),
        None => (v, None),
    }
}

fn smol(v: &[u8]) -> SmolStr {
    SmolStr::new(String::from_utf8_lossy(v))
}

fn lossy(v: &[u8]) -> String {
    String::from_utf8_lossy(v).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::decode_session;

    fn decode(input: &[u8]) -> Result<Message, DecodeError> {
        let session = decode_session(input, None).expect("lexes");
        let mut message = Message::default();
        Decoder::new(&session).decode(&mut message)?;
        Ok(message)
    }

    fn kind_of(result: Result<Message, DecodeError>) -> DecodeErrorKind {
        result.expect_err("should fail").kind().clone()
    }

    const EXAMPLE: &[u8] = b"v=0\n\
        o=jdoe 2890844526 2890842807 IN IP4 10.47.16.5\n\
        s=SDP Seminar\n\
        i=A Seminar on the session description protocol\n\
        u=http://www.example.com/seminars/sdp.pdf\n\
        e=j.doe@example.com (Jane Doe)\n\
        c=IN IP4 224.2.17.12/127\n\
        t=2873397496 2873404696\n\
        a=recvonly\n\
        m=audio 49170 RTP/AVP 0\n\
        m=video 51372 RTP/AVP 99\n\
        a=rtpmap:99 h263-1998/90000\n";

    #[test]
    fn decodes_rfc_example_session() {
        let m = decode(EXAMPLE).unwrap();

        assert_eq!(m.version, 0);
        assert_eq!(m.origin.username, "jdoe");
        assert_eq!(m.origin.session_id, 2_890_844_526);
        assert_eq!(m.origin.session_version, 2_890_842_807);
        assert_eq!(m.origin.network_type, "IN");
        assert_eq!(m.origin.address_type, "IP4");
        assert_eq!(m.origin.address, "10.47.16.5");
        assert_eq!(m.name, "SDP Seminar");
        assert_eq!(m.info.as_deref(), Some("A Seminar on the session description protocol"));
        assert_eq!(m.uri.as_deref(), Some("http://www.example.com/seminars/sdp.pdf"));
        assert_eq!(m.email.as_deref(), Some("j.doe@example.com (Jane Doe)"));

        assert_eq!(m.connection.ip, Some("224.2.17.12".parse().unwrap()));
        assert_eq!(m.connection.ttl, 127);
        assert_eq!(m.connection.addresses, 0);

        assert_eq!(m.start().as_secs(), 2_873_397_496);
        assert_eq!(m.end().as_secs(), 2_873_404_696);
        assert!(m.flag("recvonly"));

        assert_eq!(m.medias.len(), 2);
        let audio = &m.medias[0].description;
        assert_eq!(audio.kind, "audio");
        assert_eq!(audio.port, 49_170);
        assert_eq!(audio.protocol, "RTP/AVP");
        assert_eq!(audio.formats, vec!["0"]);

        let video = &m.medias[1];
        assert_eq!(video.description.formats, vec!["99"]);
        assert_eq!(video.attribute("rtpmap"), "99 h263-1998/90000");
        assert_eq!(video.payload_format("99"), "h263-1998/90000");
        assert_eq!(video.payload_format("0"), "");
    }

    #[test]
    fn rejects_timing_before_session_name() {
        let input = b"v=0\n\
            o=jdoe 1 1 IN IP4 10.47.16.5\n\
            t=0 0\n\
            s=SDP Seminar\n";
        match kind_of(decode(input)) {
            DecodeErrorKind::UnexpectedField { field, .. } => {
                assert_eq!(field, FieldType::SessionName);
            }
            other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_field_letter() {
        let input = "v=0\n\
            o=jdoe 1 1 IN IP4 10.47.16.5\n\
            s=x\n\
            \u{444}=\u{41e}\u{41f}\u{410}\u{421}\u{41d}\u{41e}\n";
        match kind_of(decode(input.as_bytes())) {
            DecodeErrorKind::UnexpectedField { field, .. } => {
                assert_eq!(field, FieldType::Other('\u{444}'));
            }
            other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn rejects_ttl_for_ipv6() {
        let input = b"v=0\n\
            o=jdoe 1 1 IN IP6 ff15::101\n\
            s=x\n\
            c=IN IP6 ff15::103/64/2\n";
        assert_eq!(
            kind_of(decode(input)),
            DecodeErrorKind::ConnectionShape { reason: "unexpected TTL for IPv6" }
        );
    }

    #[test]
    fn ipv6_slash_part_is_address_count() {
        let m = decode(b"v=0\no=j 1 1 IN IP6 ff15::101\ns=x\nc=IN IP6 ff15::103/3\n").unwrap();
        assert_eq!(m.connection.ip, Some("ff15::103".parse().unwrap()));
        assert_eq!(m.connection.ttl, 0);
        assert_eq!(m.connection.addresses, 3);
    }

    #[test]
    fn ipv4_slash_parts_are_ttl_then_count() {
        let m = decode(b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nc=IN IP4 224.2.36.42/95/4\n").unwrap();
        assert_eq!(m.connection.ttl, 95);
        assert_eq!(m.connection.addresses, 4);
    }

    #[test]
    fn media_connection_stays_with_the_media() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            m=audio 49170 RTP/AVP 0\n\
            c=IN IP4 224.2.1.1/127/3\n";
        let m = decode(input).unwrap();
        assert!(m.connection.blank());
        let conn = &m.medias[0].connection;
        assert_eq!(conn.ip, Some("224.2.1.1".parse().unwrap()));
        assert_eq!(conn.ttl, 127);
        assert_eq!(conn.addresses, 3);
    }

    #[test]
    fn rejects_unparseable_connection_address() {
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nc=IN IP4 bogus\n";
        assert_eq!(
            kind_of(decode(input)),
            DecodeErrorKind::IpParse { value: "bogus".to_owned() }
        );
    }

    #[test]
    fn rejects_wrong_connection_subfield_count() {
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nc=IN IP4\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::SubFieldCount { found: 2, .. }
        ));
        // consecutive spaces produce an empty extra sub-field
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nc=IN  IP4 1.2.3.4\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::SubFieldCount { found: 4, .. }
        ));
    }

    #[test]
    fn decodes_time_zone_adjustments() {
        let m = decode(b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nz=2882844526 -1h 2898848070 0\n")
            .unwrap();
        assert_eq!(
            m.tz_adjustments,
            vec![
                TimeZone {
                    start: NtpTime::from_secs(2_882_844_526),
                    offset: Interval::from_hours(-1),
                },
                TimeZone {
                    start: NtpTime::from_secs(2_898_848_070),
                    offset: Interval::ZERO,
                },
            ]
        );
    }

    #[test]
    fn rejects_odd_time_zone_subfields() {
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nz=2882844526 -1h 2898848070\n";
        assert_eq!(kind_of(decode(input)), DecodeErrorKind::TimeZoneParity { found: 3 });
    }

    #[test]
    fn decodes_bandwidth_into_section_maps() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            b=CT:154798\n\
            m=audio 49170 RTP/AVP 0\n\
            b=AS:66781\n";
        let m = decode(input).unwrap();
        assert_eq!(m.bandwidths.get(BandwidthType::ConferenceTotal), Some(154_798));
        assert_eq!(m.bandwidths.get(BandwidthType::ApplicationSpecific), None);
        assert_eq!(
            m.medias[0].bandwidths.get(BandwidthType::ApplicationSpecific),
            Some(66_781)
        );
    }

    #[test]
    fn rejects_bad_bandwidth_lines() {
        let prefix = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\n";
        let with = |line: &str| [prefix.as_slice(), line.as_bytes()].concat();

        assert_eq!(
            kind_of(decode(&with("b=RS:1"))),
            DecodeErrorKind::BadBandwidthType { value: "RS".to_owned() }
        );
        assert_eq!(
            kind_of(decode(&with("b=CT"))),
            DecodeErrorKind::EmptyValue { what: "bandwidth" }
        );
        assert_eq!(
            kind_of(decode(&with("b=CT:"))),
            DecodeErrorKind::EmptyValue { what: "bandwidth" }
        );
        assert_eq!(
            kind_of(decode(&with("b=AS:x"))),
            DecodeErrorKind::NumberParse { value: "x".to_owned() }
        );
    }

    #[test]
    fn decodes_encryption_forms() {
        let m = decode(b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nk=prompt\n").unwrap();
        assert_eq!(m.encryption.method, "prompt");
        assert!(m.encryption.key.is_empty());

        let m = decode(b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nk=clear:ab8c4df8b8f4as8v8iuy8re\n")
            .unwrap();
        assert_eq!(m.encryption.method, "clear");
        assert_eq!(m.encryption.key, "ab8c4df8b8f4as8v8iuy8re");

        assert_eq!(
            kind_of(decode(b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nk=clear:\n")),
            DecodeErrorKind::EmptyValue { what: "encryption key" }
        );
    }

    #[test]
    fn media_encryption_stays_with_the_media() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            m=audio 49170 RTP/AVP 0\n\
            k=prompt\n";
        let m = decode(input).unwrap();
        assert!(m.encryption.blank());
        assert_eq!(m.medias[0].encryption.method, "prompt");
    }

    #[test]
    fn decodes_multiple_time_descriptions() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            t=3034423619 3042462419\n\
            r=604800 3600 0 90000\n\
            t=3034423700 3042462500\n\
            r=7d 1h 0 25h\n";
        let m = decode(input).unwrap();
        assert_eq!(m.timings.len(), 2);
        assert_eq!(m.timings[0].start.as_secs(), 3_034_423_619);
        assert_eq!(m.timings[0].repeat, Interval::from_days(7));
        assert_eq!(m.timings[1].start.as_secs(), 3_034_423_700);
        assert_eq!(m.timings[1].active, Interval::from_hours(1));
        assert_eq!(
            m.timings[1].offsets,
            vec![Interval::ZERO, Interval::from_hours(25)]
        );
    }

    #[test]
    fn repeat_lines_accumulate_offsets() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            t=3034423619 3042462419\n\
            r=604800 3600 0\n\
            r=7d 1h 25h\n";
        let m = decode(input).unwrap();
        assert_eq!(m.timings.len(), 1);
        assert_eq!(
            m.timings[0].offsets,
            vec![Interval::ZERO, Interval::from_hours(25)]
        );
    }

    #[test]
    fn session_fields_resume_after_time_section() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            t=0 0\n\
            k=clear:secret\n\
            a=recvonly\n";
        let m = decode(input).unwrap();
        assert_eq!(m.encryption.method, "clear");
        assert!(m.flag("recvonly"));
    }

    #[test]
    fn media_title_and_flush_at_end_of_input() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            m=audio 49170 RTP/AVP 0\n\
            i=Audio Stream\n\
            a=sendrecv\n";
        let m = decode(input).unwrap();
        assert_eq!(m.medias.len(), 1);
        assert_eq!(m.medias[0].title.as_deref(), Some("Audio Stream"));
        assert!(m.medias[0].flag("sendrecv"));
        assert!(m.info.is_none());
    }

    #[test]
    fn rejects_media_title_after_connection() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            m=audio 49170 RTP/AVP 0\n\
            c=IN IP4 224.2.1.1\n\
            i=Audio Stream\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::UnexpectedField { field: FieldType::SessionInfo, .. }
        ));
    }

    #[test]
    fn decodes_media_port_count_and_formats() {
        let input = b"v=0\n\
            o=j 1 1 IN IP4 1.2.3.4\n\
            s=x\n\
            m=video 49170/2 RTP/AVP 31 32\n";
        let m = decode(input).unwrap();
        let desc = &m.medias[0].description;
        assert_eq!(desc.kind, "video");
        assert_eq!(desc.port, 49_170);
        assert_eq!(desc.ports_number, 2);
        assert_eq!(desc.protocol, "RTP/AVP");
        assert_eq!(desc.formats, vec!["31", "32"]);
    }

    #[test]
    fn rejects_short_media_description() {
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nm=audio 49170 RTP/AVP\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::SubFieldCount { found: 3, .. }
        ));
    }

    #[test]
    fn rejects_wrong_origin_shape() {
        let input = b"v=0\no=jdoe 1 1 IN IP4\ns=x\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::SubFieldCount { found: 5, .. }
        ));
        let input = b"v=0\no=jdoe x 1 IN IP4 1.2.3.4\ns=x\n";
        assert_eq!(
            kind_of(decode(input)),
            DecodeErrorKind::NumberParse { value: "x".to_owned() }
        );
    }

    #[test]
    fn rejects_wrong_timing_shape() {
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nt=0\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::SubFieldCount { found: 1, .. }
        ));
        let input = b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nt=0 0 0\n";
        assert!(matches!(
            kind_of(decode(input)),
            DecodeErrorKind::SubFieldCount { found: 3, .. }
        ));
    }

    #[test]
    fn rejects_bad_version() {
        assert_eq!(
            kind_of(decode(b"v=x\no=j 1 1 IN IP4 1.2.3.4\ns=x\n")),
            DecodeErrorKind::NumberParse { value: "x".to_owned() }
        );
    }

    #[test]
    fn empty_input_decodes_to_default_message() {
        assert_eq!(decode(b"").unwrap(), Message::default());
    }

    #[test]
    fn errors_name_section_field_and_line() {
        let err = decode(b"v=0\no=j 1 1 IN IP4 1.2.3.4\ns=x\nz=1 -1h 2\n").unwrap_err();
        assert_eq!(err.place(), "s/time zones at line 4");
        assert!(err.to_string().contains("time zones"));
    }
}
