use crate::domain::event::{DEFAULT_MESSAGE_TYPE, NormalizedEvent, RawItem, printable_message_type};
use crate::domain::timestamp::parse_date_utc;
use std::sync::Arc;
use time::format_description::OwnedFormatItem;

/// Turns raw device items into publishable events. Never fails: every field
/// falls back to something sensible and the problem is only logged.
#[derive(Clone, Debug)]
pub struct EventNormalizer {
    display_format: Arc<OwnedFormatItem>,
}

impl EventNormalizer {
    #[must_use]
    pub fn new(display_format: OwnedFormatItem) -> Self {
        Self { display_format: Arc::new(display_format) }
    }

    #[must_use]
    pub fn normalize(&self, item: RawItem) -> NormalizedEvent {
        let message_type = if item.message_type.is_empty() {
            tracing::warn!(device_id = %item.device_id, "Message type is empty, using '{DEFAULT_MESSAGE_TYPE}'");
            DEFAULT_MESSAGE_TYPE.to_string()
        } else {
            item.message_type
        };

        let printable_date_time = self.printable_date_time(&item.date_time);

        NormalizedEvent {
            printable_message_type: printable_message_type(&message_type),
            message_type,
            device_id: item.device_id,
            tel: item.tel,
            date_time: item.date_time,
            printable_date_time,
            sms_date_time: item.sms_date_time,
            marked: false,
            text: item.text,
        }
    }

    fn printable_date_time(&self, raw: &str) -> String {
        let instant = match parse_date_utc(raw) {
            Ok(instant) => instant,
            Err(e) => {
                tracing::warn!(error = %e, "Error parsing date");
                return raw.to_string();
            }
        };

        instant.format(self.display_format.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Error formatting date");
            raw.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIME_FORMAT;

    fn normalizer() -> EventNormalizer {
        EventNormalizer::new(time::format_description::parse_owned::<1>(DEFAULT_TIME_FORMAT).unwrap())
    }

    fn item(message_type: &str, date_time: &str) -> RawItem {
        RawItem {
            device_id: "pixel-7".into(),
            message_type: message_type.into(),
            date_time: date_time.into(),
            sms_date_time: "2024-03-05 14:06".into(),
            tel: "+15550100".into(),
            text: "Your code is 1234".into(),
        }
    }

    #[test]
    fn test_sms_item_is_normalized() {
        let event = normalizer().normalize(item("sms", "2024-03-05 14:07 +0000"));

        assert_eq!(event.message_type, "sms");
        assert_eq!(event.printable_message_type, "SMS");
        assert_eq!(event.printable_date_time, "05 Mar 2024 14:07:00 UTC");
        assert_eq!(event.date_time, "2024-03-05 14:07 +0000");
        assert_eq!(event.sms_date_time, "2024-03-05 14:06");
        assert_eq!(event.device_id, "pixel-7");
        assert_eq!(event.tel, "+15550100");
        assert_eq!(event.text, "Your code is 1234");
        assert!(!event.marked);
    }

    #[test]
    fn test_message_type_labels() {
        let n = normalizer();
        let cases = [("", "sms", "SMS"), ("notification", "notification", "Notification"), ("push", "push", "Type push")];

        for (input, expected_type, expected_label) in cases {
            let event = n.normalize(item(input, "2024-03-05"));
            assert_eq!(event.message_type, expected_type);
            assert_eq!(event.printable_message_type, expected_label);
        }
    }

    #[test]
    fn test_offset_is_converted_before_formatting() {
        let event = normalizer().normalize(item("sms", "2024-03-05T01:00:00+03:00"));
        assert_eq!(event.printable_date_time, "04 Mar 2024 22:00:00 UTC");
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        for raw in ["", "not a date", "  2024/03/05  ", "2024-03-05 14:07 +0300"] {
            let event = normalizer().normalize(item("sms", raw));
            assert_eq!(event.printable_date_time, raw);
            assert_eq!(event.date_time, raw);
        }
    }

    #[test]
    fn test_device_formats_with_fraction_and_short_hour() {
        let n = normalizer();
        assert_eq!(n.normalize(item("sms", "2024-03-05T14:07:09.123")).printable_date_time, "05 Mar 2024 14:07:09 UTC");
        assert_eq!(n.normalize(item("sms", "2024-03-05 9:07:09")).printable_date_time, "05 Mar 2024 09:07:09 UTC");
    }

    #[test]
    fn test_custom_display_format() {
        let n = EventNormalizer::new(time::format_description::parse_owned::<1>("[year]/[month]/[day]").unwrap());
        let event = n.normalize(item("sms", "Mar 5, 2024 14:07"));
        assert_eq!(event.printable_date_time, "2024/03/05");
    }
}
