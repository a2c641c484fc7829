//! quick-xml driver for the response handler

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use soundtouch_api::DeviceId;

use super::{Attributes, ModelUpdate, ResponseHandler};
use crate::error::{Result, StreamError};

/// Parse one inbound message into model updates
///
/// Text is trimmed and unescaped, and self-closing elements are reported to
/// the handler as an open followed by a close. Any reader error, or a
/// document that ends with elements still open, fails the whole message so
/// that none of its updates are applied.
pub fn parse_message(own_id: &DeviceId, xml: &str) -> Result<Vec<ModelUpdate>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut handler = ResponseHandler::new(own_id);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let (name, attrs) = element(e)?;
                handler.start_element(&name, &attrs);
            }
            Ok(Event::Empty(ref e)) => {
                let (name, attrs) = element(e)?;
                handler.start_element(&name, &attrs);
                handler.end_element();
            }
            Ok(Event::End(_)) => handler.end_element(),
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(malformed)?;
                handler.characters(text.trim());
            }
            Ok(Event::CData(t)) => {
                let raw = t.into_inner();
                let text = std::str::from_utf8(&raw).map_err(malformed)?;
                handler.characters(text.trim());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(StreamError::MalformedMessage(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if handler.depth() != 0 {
        return Err(StreamError::MalformedMessage(format!(
            "document ended with {} open element(s)",
            handler.depth()
        )));
    }

    Ok(handler.finish())
}

fn element(e: &BytesStart<'_>) -> Result<(String, Attributes)> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(malformed)?
        .to_string();

    let mut attrs = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?;
        attrs.push(key, value.into_owned());
    }

    Ok((name, attrs))
}

fn malformed(e: impl std::fmt::Display) -> StreamError {
    StreamError::MalformedMessage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::NowPlayingField;
    use rstest::rstest;
    use soundtouch_api::{ContentItem, Preset, Query, Source};

    const OWN: &str = "A0F6FD12ABCD";

    fn parse(xml: &str) -> Vec<ModelUpdate> {
        parse_message(&DeviceId::new(OWN), xml).unwrap()
    }

    #[test]
    fn test_info_reply_requests_follow_ups() {
        let xml = r#"<msg><header deviceID="A0F6FD12ABCD" url="info" method="GET"><request requestID="0"><info type="new"/></request></header><body><info deviceID="A0F6FD12ABCD"><name>Living Room</name><type>SoundTouch 20</type><margeAccountUUID>123</margeAccountUUID><components><component><componentCategory>SCM</componentCategory></component></components></info></body></msg>"#;

        assert_eq!(
            parse(xml),
            vec![
                ModelUpdate::DeviceName("Living Room".to_string()),
                ModelUpdate::DeviceType("SoundTouch 20".to_string()),
                ModelUpdate::FollowUp(Query::Volume),
                ModelUpdate::FollowUp(Query::Presets),
                ModelUpdate::FollowUp(Query::NowPlaying),
                ModelUpdate::FollowUp(Query::Zone),
            ]
        );
    }

    #[test]
    fn test_presets_reply() {
        let xml = r#"<msg><header deviceID="A0F6FD12ABCD" url="presets" method="GET"><request requestID="2"><info type="new"/></request></header><body><presets>
            <preset id="1" createdOn="1" updatedOn="1"><ContentItem source="INTERNET_RADIO" location="L0" sourceAccount="" isPresetable="true"><itemName>KEXP</itemName></ContentItem></preset>
            <preset id="2"><ContentItem source="INTERNET_RADIO" location="L1" sourceAccount=""><itemName>Jazz24</itemName></ContentItem></preset>
        </presets></body></msg>"#;

        assert_eq!(
            parse(xml),
            vec![
                ModelUpdate::PresetsCleared,
                ModelUpdate::PresetStored(Preset::with_content_item(
                    1,
                    ContentItem::new(Source::InternetRadio, "L0", "", "KEXP")
                )),
                ModelUpdate::PresetStored(Preset::with_content_item(
                    2,
                    ContentItem::new(Source::InternetRadio, "L1", "", "Jazz24")
                )),
            ]
        );
    }

    #[test]
    fn test_now_playing_update_with_details() {
        let xml = r#"<updates deviceID="A0F6FD12ABCD"><nowPlayingUpdated><nowPlaying deviceID="A0F6FD12ABCD" source="INTERNET_RADIO"><ContentItem source="INTERNET_RADIO" location="L1" sourceAccount=""><itemName>Jazz24</itemName><containerArt>http://x/art.png</containerArt></ContentItem><track>Blue &amp; Green</track><artist>Miles Davis</artist><art artImageStatus="IMAGE_PRESENT">http://x/art.png</art><playStatus>PLAY_STATE</playStatus><time total="0">12</time></nowPlaying></nowPlayingUpdated></updates>"#;

        assert_eq!(
            parse(xml),
            vec![
                ModelUpdate::NowPlayingSource("INTERNET_RADIO".to_string()),
                ModelUpdate::NowPlayingItem(ContentItem::new(
                    Source::InternetRadio,
                    "L1",
                    "",
                    "Jazz24"
                )),
                ModelUpdate::NowPlayingField(NowPlayingField::Track, "Blue & Green".to_string()),
                ModelUpdate::NowPlayingField(NowPlayingField::Artist, "Miles Davis".to_string()),
                ModelUpdate::NowPlayingField(NowPlayingField::Art, "http://x/art.png".to_string()),
                ModelUpdate::NowPlayingField(NowPlayingField::PlayStatus, "PLAY_STATE".to_string()),
            ]
        );
    }

    #[test]
    fn test_standby_content_item_without_name() {
        let xml = r#"<updates deviceID="A0F6FD12ABCD"><nowPlayingUpdated><nowPlaying deviceID="A0F6FD12ABCD" source="STANDBY"><ContentItem source="STANDBY" isPresetable="true"/></nowPlaying></nowPlayingUpdated></updates>"#;

        assert_eq!(
            parse(xml),
            vec![
                ModelUpdate::NowPlayingSource("STANDBY".to_string()),
                ModelUpdate::NowPlayingItem(ContentItem::new(Source::Standby, "", "", "")),
            ]
        );
    }

    #[test]
    fn test_zone_reply() {
        let xml = r#"<msg><header deviceID="A0F6FD12ABCD" url="getZone" method="GET"><request requestID="4"><info type="new"/></request></header><body><zone master="A0F6FD12ABCD"><member ipaddress="192.168.1.21">B1B1B1B1B1B1</member><member ipaddress="192.168.1.22">c2c2c2c2c2c2</member></zone></body></msg>"#;

        assert_eq!(
            parse(xml),
            vec![
                ModelUpdate::ZoneStarted {
                    master: Some(DeviceId::new(OWN))
                },
                ModelUpdate::ZoneMemberStarted {
                    ip_address: "192.168.1.21".to_string()
                },
                ModelUpdate::ZoneMemberMac(DeviceId::new("B1B1B1B1B1B1")),
                ModelUpdate::ZoneMemberStarted {
                    ip_address: "192.168.1.22".to_string()
                },
                ModelUpdate::ZoneMemberMac(DeviceId::new("C2C2C2C2C2C2")),
                ModelUpdate::ZonesChanged,
            ]
        );
    }

    #[test]
    fn test_empty_zone_reply() {
        let xml = r#"<msg><header deviceID="A0F6FD12ABCD" url="getZone" method="GET"><request requestID="4"><info type="new"/></request></header><body><zone /></body></msg>"#;

        assert_eq!(
            parse(xml),
            vec![
                ModelUpdate::ZoneStarted { master: None },
                ModelUpdate::ZonesChanged
            ]
        );
    }

    #[test]
    fn test_zone_updated_only_asks_for_zone() {
        let xml = r#"<updates deviceID="A0F6FD12ABCD"><zoneUpdated><zone master="B1B1B1B1B1B1"><member ipaddress="192.168.1.20">A0F6FD12ABCD</member></zone></zoneUpdated></updates>"#;

        assert_eq!(parse(xml), vec![ModelUpdate::FollowUp(Query::Zone)]);
    }

    #[rstest]
    #[case::sdk_info(r#"<SoundTouchSdkInfo serverVersion="4" serverBuild="trunk r42017 v4"/>"#)]
    #[case::user_activity(r#"<userActivityUpdate deviceID="A0F6FD12ABCD" />"#)]
    #[case::connection_state(r#"<updates deviceID="A0F6FD12ABCD"><connectionStateUpdated state="NETWORK_WIFI_CONNECTED" up="true" signal="GOOD_SIGNAL" /></updates>"#)]
    #[case::recents(r#"<updates deviceID="A0F6FD12ABCD"><recentsUpdated><recents><recent deviceID="A0F6FD12ABCD" utcTime="1"><contentItem source="AUX"><itemName>AUX</itemName></contentItem></recent></recents></recentsUpdated></updates>"#)]
    #[case::key_confirmation(r#"<msg><header deviceID="A0F6FD12ABCD" url="key" method="POST"><request requestID="5"><info type="new"/></request></header><body><key state="press" sender="Gabbo">PLAY</key></body></msg>"#)]
        #[case::future_element(r#"<updates deviceID="A0F6FD12ABCD"><somethingNew><deeper>text</deeper></somethingNew></updates>"#)]
    #[case::foreign_device(r#"<updates deviceID="FFFFFFFFFFFF"><volumeUpdated><volume><actualvolume>5</actualvolume></volume></volumeUpdated></updates>"#)]
    fn test_ignored_messages_produce_no_updates(#[case] xml: &str) {
        assert!(parse(xml).is_empty());
    }

    #[test]
    fn test_identity_case_is_ignored() {
        let xml = r#"<updates deviceID="a0f6fd12abcd"><volumeUpdated><volume><actualvolume>12</actualvolume><muteenabled>true</muteenabled></volume></volumeUpdated></updates>"#;
        assert_eq!(parse(xml), vec![ModelUpdate::Volume(12), ModelUpdate::Mute(true)]);
    }

    #[rstest]
    #[case::mismatched_tags("<msg><header></msg>")]
    #[case::truncated(r#"<updates deviceID="A0F6FD12ABCD"><volumeUpdated>"#)]
    #[case::bad_attribute(r#"<updates deviceID=A0F6FD12ABCD></updates>"#)]
    fn test_malformed_messages_fail(#[case] xml: &str) {
        let result = parse_message(&DeviceId::new(OWN), xml);
        assert!(matches!(result, Err(StreamError::MalformedMessage(_))));
    }
}
