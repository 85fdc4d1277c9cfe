//! Builds a session description field by field and prints its wire form.

use sdp::{ConnectionData, MediaDescription, Origin, Session};

fn main() {
    let mut session = Session::new();
    session
        .add_version(0)
        .add_origin(&Origin {
            username: "jdoe".into(),
            session_id: 2_890_844_526,
            session_version: 2_890_842_807,
            address: "10.47.16.5".into(),
            ..Origin::default()
        })
        .add_session_name("SDP Seminar")
        .add_connection_data(&ConnectionData {
            ip: Some("224.2.17.12".parse().unwrap()),
            ttl: 127,
            ..ConnectionData::default()
        })
        .add_timing_ntp(2_873_397_496, 2_873_404_696)
        .add_flag("recvonly")
        .add_media_description(&MediaDescription {
            kind: "audio".into(),
            port: 49_170,
            protocol: "RTP/AVP".into(),
            formats: vec!["0".into()],
            ..MediaDescription::default()
        });

    let mut buf = Vec::new();
    session.append_to(&mut buf);
    println!("{}", String::from_utf8(buf).expect("sdp is utf-8"));
}
