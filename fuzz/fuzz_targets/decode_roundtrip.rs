// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_main]
use libfuzzer_sys::fuzz_target;
use sdp::{decode_session, Decoder, Message, Session};

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }

    let Ok(session) = decode_session(data, None) else {
        return;
    };
    let mut message = Message::default();
    if Decoder::new(&session).decode(&mut message).is_err() {
        return;
    }

    // Encoder output must always lex. A first round also canonicalizes
    // quirks raw input may carry (attribute-name whitespace that only the
    // flag form exposes, sub-field whitespace the scanner trims).
    let mut encoded = Session::new();
    message.append_to(&mut encoded);
    let mut buf = Vec::new();
    encoded.append_to(&mut buf);
    let reparsed = decode_session(&buf, None).expect("encoder output must lex");

    // The emission order is not always semantically re-decodable (a z=
    // line renders after the time section it must precede on decode), so
    // only messages whose encoding decodes again are held to the fixpoint.
    let mut canonical = Message::default();
    if Decoder::new(&reparsed).decode(&mut canonical).is_err() {
        return;
    }

    let mut encoded2 = Session::new();
    canonical.append_to(&mut encoded2);
    let mut buf2 = Vec::new();
    encoded2.append_to(&mut buf2);
    let reparsed2 = decode_session(&buf2, None).expect("encoder output must lex");
    assert_eq!(reparsed2, encoded2);
});
