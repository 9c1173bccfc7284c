//! Translate a [`vpnsentinel_registry::Transition`] into the
//! [`Notification`] it warrants (§4.2, §4.4).

use vpnsentinel_registry::{Classification, Transition};

use crate::kind::{BypassFields, ConnectionFields, Notification, OfflineFields};

/// Build the notification for one transition, or `None` if — despite
/// `Transition` existing — there's nothing to say (shouldn't happen in
/// practice since `detect()` already filters no-op transitions, but kept
/// total for callers that construct transitions by hand, e.g. tests).
pub fn notification_for(transition: &Transition) -> Option<Notification> {
    if transition.new_state == vpnsentinel_registry::ClientState::Offline {
        let record = &transition.record;
        return Some(Notification::Offline(OfflineFields {
            client_id: record.client_id.clone(),
            last_seen_absolute: record.last_seen,
            last_seen_humanized: record.humanized_last_seen(chrono::Utc::now()),
        }));
    }

    let class = transition.new_state.classification()?;
    let record = &transition.record;
    let payload = &record.last_payload;

    if class == Classification::Bypass {
        return Some(Notification::Bypass(BypassFields {
            client_id: record.client_id.clone(),
            client_ip: payload.public_ip.clone(),
            server_ip: payload.public_ip.clone(),
            city: payload.location.city.clone(),
            country: payload.location.country.clone(),
        }));
    }

    let fields = ConnectionFields {
        client_id: record.client_id.clone(),
        client_version: record.version_or_unknown().to_string(),
        public_ip: payload.public_ip.clone(),
        previous_ip: transition.ip_changed.as_ref().map(|(prev, _)| prev.clone()),
        city: payload.location.city.clone(),
        region: payload.location.region.clone(),
        country: payload.location.country.clone(),
        provider: payload.location.org.clone(),
        dns_location: payload.dns_test.location.clone(),
        dns_colo: payload.dns_test.colo.clone(),
        classification: class.to_string(),
    };

    let previous_class = transition.previous_state.classification();
    let class_changed = !transition.is_initial_connect && previous_class != Some(class);

    if transition.is_initial_connect || class_changed {
        Some(match class {
            Classification::Secure => Notification::Connected(fields),
            Classification::DnsLeak => Notification::DnsLeak(fields),
            Classification::DnsUnknown => Notification::DnsUnknown(fields),
            Classification::Bypass => unreachable!("handled above"),
        })
    } else if transition.ip_changed.is_some() {
        Some(Notification::IpChanged(fields))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::time::Instant;
    use vpnsentinel_core::payload::{DnsTest, KeepalivePayload, Location};
    use vpnsentinel_registry::record::ClientRecord;
    use vpnsentinel_registry::transition::detect;

    fn make_record(public_ip: &str, country: &str, dns_loc: &str) -> ClientRecord {
        let payload = KeepalivePayload {
            client_id: "agent-1".into(),
            timestamp: DateTime::parse_from_rfc3339("2026-07-27T10:00:00+00:00").unwrap(),
            public_ip: public_ip.to_string(),
            status: "alive".into(),
            client_version: Some("1.0".into()),
            location: Location {
                country: country.to_string(),
                city: "Bucharest".into(),
                region: "Bucharest".into(),
                org: "RCS&RDS".into(),
                timezone: "Europe/Bucharest".into(),
            },
            dns_test: DnsTest {
                location: dns_loc.to_string(),
                colo: "OTP".into(),
            },
        };
        ClientRecord::new(payload, Utc::now(), Instant::now())
    }

    #[test]
    fn first_connection_yields_connected() {
        let mut record = make_record("1.2.3.4", "Romania", "RO");
        let t = detect(&mut record, vpnsentinel_registry::ClientState::New, None, None).unwrap();
        let n = notification_for(&t).expect("should notify");
        assert!(matches!(n, Notification::Connected(_)));
    }

    #[test]
    fn dns_leak_on_first_connection() {
        let mut record = make_record("1.2.3.4", "ES", "DE");
        let t = detect(&mut record, vpnsentinel_registry::ClientState::New, None, None).unwrap();
        let n = notification_for(&t).expect("should notify");
        assert!(matches!(n, Notification::DnsLeak(_)));
    }

    #[test]
    fn bypass_takes_priority_over_dns_leak() {
        let mut record = make_record("203.0.113.5", "ES", "DE");
        let t = detect(
            &mut record,
            vpnsentinel_registry::ClientState::New,
            None,
            Some("203.0.113.5"),
        )
        .unwrap();
        let n = notification_for(&t).expect("should notify");
        match n {
            Notification::Bypass(fields) => {
                assert_eq!(fields.client_ip, "203.0.113.5");
                assert_eq!(fields.server_ip, "203.0.113.5");
            }
            other => panic!("expected Bypass, got {other:?}"),
        }
    }

    #[test]
    fn ip_change_same_class_yields_ip_changed() {
        let mut record = make_record("5.6.7.8", "Romania", "RO");
        record.ever_seen_online = true;
        let t = detect(
            &mut record,
            vpnsentinel_registry::ClientState::OnlineSecure,
            Some("1.2.3.4".to_string()),
            None,
        )
        .unwrap();
        let n = notification_for(&t).expect("should notify");
        match n {
            Notification::IpChanged(fields) => {
                assert_eq!(fields.previous_ip.as_deref(), Some("1.2.3.4"));
                assert_eq!(fields.public_ip, "5.6.7.8");
            }
            other => panic!("expected IpChanged, got {other:?}"),
        }
    }

    #[test]
    fn class_change_consolidates_ip_change_into_single_message() {
        let mut record = make_record("9.9.9.9", "ES", "DE");
        record.ever_seen_online = true;
        let t = detect(
            &mut record,
            vpnsentinel_registry::ClientState::OnlineSecure,
            Some("1.2.3.4".to_string()),
            None,
        )
        .unwrap();
        let n = notification_for(&t).expect("should notify");
        match n {
            Notification::DnsLeak(fields) => {
                assert_eq!(fields.previous_ip.as_deref(), Some("1.2.3.4"));
            }
            other => panic!("expected DnsLeak (consolidated), got {other:?}"),
        }
    }
}
