use amf::{Pair, amf0::Value as Amf0Value};

use consts::{c2s_command_names, connect_properties, s2c_command_names};

pub mod consts;
pub mod reader;
pub mod writer;

/// A command message is an ordered sequence of AMF0 values: the command name,
/// the transaction id, then whatever the command calls for.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMessage {
    pub values: Vec<Amf0Value>,
}

impl CommandMessage {
    pub fn new(values: Vec<Amf0Value>) -> Self {
        Self { values }
    }

    ///! @see: 7.2.1.1. connect
    /// Transaction id is always 1; `extra` extends the argument list after
    /// the command object.
    pub fn connect_request(
        app: &str,
        tc_url: &str,
        page_url: &str,
        swf_url: &str,
        extra: Vec<Amf0Value>,
    ) -> Self {
        let command_object = Amf0Value::Object {
            class_name: None,
            entries: vec![
                pair(
                    "videoCodecs",
                    Amf0Value::Number(connect_properties::VIDEO_CODECS),
                ),
                pair(
                    "audioCodecs",
                    Amf0Value::Number(connect_properties::AUDIO_CODECS),
                ),
                pair(
                    "flashVer",
                    Amf0Value::String(connect_properties::FLASH_VERSION.to_owned()),
                ),
                pair("app", Amf0Value::String(app.to_owned())),
                pair("tcUrl", Amf0Value::String(tc_url.to_owned())),
                pair(
                    "videoFunction",
                    Amf0Value::Number(connect_properties::VIDEO_FUNCTION),
                ),
                pair(
                    "capabilities",
                    Amf0Value::Number(connect_properties::CAPABILITIES),
                ),
                pair("pageUrl", Amf0Value::String(page_url.to_owned())),
                pair("fpad", Amf0Value::Boolean(false)),
                pair("swfUrl", Amf0Value::String(swf_url.to_owned())),
                pair(
                    "objectEncoding",
                    Amf0Value::Number(connect_properties::OBJECT_ENCODING_AMF0),
                ),
            ],
        };

        let mut values = vec![
            Amf0Value::String(c2s_command_names::CONNECT.to_owned()),
            Amf0Value::Number(1.0),
            command_object,
        ];
        values.extend(extra);
        Self { values }
    }

    /// The `_result` a server answers a connect command with.
    pub fn connect_result(
        transaction_id: f64,
        fms_ver: &str,
        capabilities: f64,
        code: &str,
        description: &str,
        level: &str,
    ) -> Self {
        let properties = Amf0Value::Object {
            class_name: None,
            entries: vec![
                pair("fmsVer", Amf0Value::String(fms_ver.to_owned())),
                pair("capabilities", Amf0Value::Number(capabilities)),
            ],
        };
        let information = Amf0Value::Object {
            class_name: None,
            entries: vec![
                pair("code", Amf0Value::String(code.to_owned())),
                pair(
                    "objectEncoding",
                    Amf0Value::Number(connect_properties::OBJECT_ENCODING_AMF0),
                ),
                pair("description", Amf0Value::String(description.to_owned())),
                pair("level", Amf0Value::String(level.to_owned())),
            ],
        };
        Self {
            values: vec![
                Amf0Value::String(s2c_command_names::RESULT.to_owned()),
                Amf0Value::Number(transaction_id),
                properties,
                information,
            ],
        }
    }

    /// A remote procedure call. No response correlation is performed.
    pub fn call_request(transaction_id: f64, parameters: Amf0Value) -> Self {
        Self {
            values: vec![
                Amf0Value::String(c2s_command_names::CALL.to_owned()),
                Amf0Value::Number(transaction_id),
                parameters,
            ],
        }
    }

    pub fn command_name(&self) -> Option<&str> {
        self.values.first().and_then(|value| value.try_as_str())
    }

    pub fn transaction_id(&self) -> Option<f64> {
        self.values.get(1).and_then(|value| value.try_as_f64())
    }

    pub fn is_result(&self) -> bool {
        self.command_name() == Some(s2c_command_names::RESULT)
    }

    /// The status code inside the information object of a `_result` or
    /// `_error`, the fourth value of the sequence.
    pub fn result_code(&self) -> Option<&str> {
        match self.values.get(3)? {
            Amf0Value::Object { entries, .. } | Amf0Value::EcmaArray { entries } => entries
                .iter()
                .find(|pair| pair.key == "code")
                .and_then(|pair| pair.value.try_as_str()),
            _ => None,
        }
    }
}

fn pair(key: &str, value: Amf0Value) -> Pair<String, Amf0Value> {
    Pair {
        key: key.to_owned(),
        value,
    }
}
