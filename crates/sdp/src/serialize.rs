// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SDP encoder: typed builder methods appending fields to a [`Session`],
//! and [`Message::append_to`] emitting a whole message in RFC 4566 order.
//!
//! Formatting rules: IPs render upper-case; connection addresses render
//! `base[/ttl][/count]` with zero sub-fields omitted; media ports render
//! `port[/count]` with a zero count omitted; repeat times and time zone
//! offsets have a canonical whole-seconds form and a compact
//! largest-exact-unit form (`604800` → `7d`).

use std::net::{IpAddr, Ipv4Addr};

use crate::line::{FieldType, Line, Session};
use crate::time::{Interval, NtpTime};
use crate::{BandwidthType, ConnectionData, MediaDescription, Message, Origin, TimeZone};

fn net_type_or_default(net_type: &str) -> &str {
    if net_type.is_empty() {
        "IN"
    } else {
        net_type
    }
}

fn origin_addr_type<'a>(addr_type: &'a str, address: &str) -> &'a str {
    if !addr_type.is_empty() {
        addr_type
    } else if address.parse::<Ipv4Addr>().is_ok() {
        "IP4"
    } else {
        "IP6"
    }
}

fn connection_addr_type(addr_type: &str, ip: Option<IpAddr>) -> &str {
    if !addr_type.is_empty() {
        addr_type
    } else if matches!(ip, Some(IpAddr::V4(_))) {
        "IP4"
    } else {
        "IP6"
    }
}

fn ip_string(ip: IpAddr) -> String {
    ip.to_string().to_uppercase()
}

impl<'a> Session<'a> {
    fn add_value(&mut self, kind: FieldType, value: String) -> &mut Self {
        self.push(Line::new(kind, value.into_bytes()));
        self
    }

    /// Appends a typed line with a preassembled value.
    pub fn add_line(&mut self, kind: FieldType, value: impl Into<Vec<u8>>) -> &mut Self {
        let value: Vec<u8> = value.into();
        self.push(Line::new(kind, value));
        self
    }

    /// Appends a line under any field letter, known to RFC 4566 or not.
    pub fn add_raw(&mut self, kind: char, value: &str) -> &mut Self {
        self.add_line(FieldType::from_char(kind), value.as_bytes().to_vec())
    }

    pub fn add_version(&mut self, version: u32) -> &mut Self {
        self.add_value(FieldType::Version, version.to_string())
    }

    pub fn add_origin(&mut self, origin: &Origin) -> &mut Self {
        let value = format!(
            "{} {} {} {} {} {}",
            origin.username,
            origin.session_id,
            origin.session_version,
            net_type_or_default(&origin.network_type),
            origin_addr_type(&origin.address_type, &origin.address),
            origin.address,
        );
        self.add_value(FieldType::Origin, value)
    }

    pub fn add_session_name(&mut self, name: &str) -> &mut Self {
        self.add_value(FieldType::SessionName, name.to_owned())
    }

    pub fn add_session_info(&mut self, info: &str) -> &mut Self {
        self.add_value(FieldType::SessionInfo, info.to_owned())
    }

    pub fn add_uri(&mut self, uri: &str) -> &mut Self {
        self.add_value(FieldType::Uri, uri.to_owned())
    }

    pub fn add_email(&mut self, email: &str) -> &mut Self {
        self.add_value(FieldType::Email, email.to_owned())
    }

    pub fn add_phone(&mut self, phone: &str) -> &mut Self {
        self.add_value(FieldType::Phone, phone.to_owned())
    }

    pub fn add_connection_data(&mut self, connection: &ConnectionData) -> &mut Self {
        let base = connection.ip.map(ip_string).unwrap_or_default();
        let mut value = format!(
            "{} {} {}",
            net_type_or_default(&connection.network_type),
            connection_addr_type(&connection.address_type, connection.ip),
            base,
        );
        if connection.ttl != 0 {
            value.push_str(&format!("/{}", connection.ttl));
        }
        if connection.addresses != 0 {
            value.push_str(&format!("/{}", connection.addresses));
        }
        self.add_value(FieldType::Connection, value)
    }

    pub fn add_bandwidth(&mut self, kind: BandwidthType, value: u32) -> &mut Self {
        self.add_value(FieldType::Bandwidth, format!("{}:{}", kind, value))
    }

    pub fn add_timing(&mut self, start: NtpTime, end: NtpTime) -> &mut Self {
        self.add_value(FieldType::Timing, format!("{} {}", start, end))
    }

    pub fn add_timing_ntp(&mut self, start: u64, end: u64) -> &mut Self {
        self.add_timing(NtpTime::from_secs(start), NtpTime::from_secs(end))
    }

    /// Canonical form: every interval as whole seconds.
    pub fn add_repeat_times(
        &mut self,
        repeat: Interval,
        active: Interval,
        offsets: &[Interval],
    ) -> &mut Self {
        let mut value = format!("{} {}", repeat, active);
        for offset in offsets {
            value.push_str(&format!(" {}", offset));
        }
        self.add_value(FieldType::RepeatTimes, value)
    }

    /// Compact form: every interval in its largest exact unit.
    pub fn add_repeat_times_compact(
        &mut self,
        repeat: Interval,
        active: Interval,
        offsets: &[Interval],
    ) -> &mut Self {
        let mut value = format!("{} {}", repeat.compact(), active.compact());
        for offset in offsets {
            value.push_str(&format!(" {}", offset.compact()));
        }
        self.add_value(FieldType::RepeatTimes, value)
    }

    pub fn add_time_zones(&mut self, zones: &[TimeZone]) -> &mut Self {
        let mut value = String::new();
        for (i, zone) in zones.iter().enumerate() {
            if i > 0 {
                value.push(' ');
            }
            value.push_str(&format!("{} {}", zone.start, zone.offset.compact()));
        }
        self.add_value(FieldType::TimeZones, value)
    }

    pub fn add_encryption_key(&mut self, method: &str, key: &str) -> &mut Self {
        self.add_value(FieldType::EncryptionKey, format!("{}:{}", method, key))
    }

    pub fn add_encryption_method(&mut self, method: &str) -> &mut Self {
        self.add_value(FieldType::EncryptionKey, method.to_owned())
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.add_value(FieldType::Attribute, format!("{}:{}", name, value))
    }

    pub fn add_flag(&mut self, name: &str) -> &mut Self {
        self.add_value(FieldType::Attribute, name.to_owned())
    }

    pub fn add_media_description(&mut self, description: &MediaDescription) -> &mut Self {
        let mut value = format!("{} {}", description.kind, description.port);
        if description.ports_number != 0 {
            value.push_str(&format!("/{}", description.ports_number));
        }
        value.push_str(&format!(" {}", description.protocol));
        for fmt in &description.formats {
            value.push_str(&format!(" {}", fmt));
        }
        self.add_value(FieldType::Media, value)
    }
}

impl Message {
    /// Appends the message as lines in RFC 4566 emission order: session
    /// fields, bandwidths, each timing with its repeat times, time zones,
    /// encryption, attributes, then each media section. Blank and empty
    /// fields are omitted; a flag attribute renders without `:`.
    pub fn append_to(&self, session: &mut Session<'_>) {
        session.add_version(self.version);
        session.add_origin(&self.origin);
        session.add_session_name(&self.name);
        if let Some(info) = &self.info {
            session.add_session_info(info);
        }
        if let Some(uri) = &self.uri {
            session.add_uri(uri);
        }
        if let Some(email) = &self.email {
            session.add_email(email);
        }
        if let Some(phone) = &self.phone {
            session.add_phone(phone);
        }
        if !self.connection.blank() {
            session.add_connection_data(&self.connection);
        }
        for (kind, value) in self.bandwidths.iter() {
            session.add_bandwidth(*kind, *value);
        }
        for timing in &self.timings {
            session.add_timing(timing.start, timing.end);
            if !timing.offsets.is_empty() {
                session.add_repeat_times_compact(timing.repeat, timing.active, &timing.offsets);
            }
        }
        if !self.tz_adjustments.is_empty() {
            session.add_time_zones(&self.tz_adjustments);
        }
        if !self.encryption.blank() {
            if self.encryption.key.is_empty() {
                session.add_encryption_method(&self.encryption.method);
            } else {
                session.add_encryption_key(&self.encryption.method, &self.encryption.key);
            }
        }
        for (name, value) in self.attributes.iter() {
            if value.is_empty() {
                session.add_flag(name);
            } else {
                session.add_attribute(name, value);
            }
        }
        for media in &self.medias {
            session.add_media_description(&media.description);
            if let Some(title) = &media.title {
                session.add_session_info(title);
            }
            if !media.connection.blank() {
                session.add_connection_data(&media.connection);
            }
            for (kind, value) in media.bandwidths.iter() {
                session.add_bandwidth(*kind, *value);
            }
            if !media.encryption.blank() {
                if media.encryption.key.is_empty() {
                    session.add_encryption_method(&media.encryption.method);
                } else {
                    session.add_encryption_key(&media.encryption.method, &media.encryption.key);
                }
            }
            for (name, value) in media.attributes.iter() {
                if value.is_empty() {
                    session.add_flag(name);
                } else {
                    session.add_attribute(name, value);
                }
            }
        }
    }
}
