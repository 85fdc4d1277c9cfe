// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_main]
use libfuzzer_sys::fuzz_target;
use sdp::{decode_session, Decoder, Message};

fuzz_target!(|data: &[u8]| {
    // Malformed input must only ever surface as an error, never a panic.
    if let Ok(session) = decode_session(data, None) {
        let mut message = Message::default();
        let _ = Decoder::new(&session).decode(&mut message);
    }
});
