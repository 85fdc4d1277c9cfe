// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decodes the RFC 4566 example session and prints its typed contents.

use sdp::{decode_session, Decoder, Message};

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
    a=rtpmap:99 h263-1998/90000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = decode_session(EXAMPLE, None)?;
    let mut message = Message::default();
    Decoder::new(&session).decode(&mut message)?;

    println!("name:     {}", message.name);
    println!("origin:   {} @ {}", message.origin.username, message.origin.address);
    if let Some(info) = &message.info {
        println!("info:     {}", info);
    }
    println!("start:    NTP {}", message.start());
    println!("end:      NTP {}", message.end());
    println!("recvonly: {}", message.flag("recvonly"));
    for media in &message.medias {
        let d = &media.description;
        println!(
            "media:    {} port {} over {}, formats {:?}",
            d.kind, d.port, d.protocol, d.formats
        );
        for (name, value) in media.attributes.iter() {
            println!("          a={}:{}", name, value);
        }
    }
    Ok(())
}
