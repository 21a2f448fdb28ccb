use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

/// Every tool the server exposes. The wire name is the camelCase form used in
/// routes (`/tools/{name}`), A2A task names and the discovery feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ResolveContact,
    ScheduleMeeting,
    SendEmail,
    ReplyToEmail,
    LabelEmail,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::ResolveContact,
        ToolName::ScheduleMeeting,
        ToolName::SendEmail,
        ToolName::ReplyToEmail,
        ToolName::LabelEmail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ResolveContact => "resolveContact",
            ToolName::ScheduleMeeting => "scheduleMeeting",
            ToolName::SendEmail => "sendEmail",
            ToolName::ReplyToEmail => "replyToEmail",
            ToolName::LabelEmail => "labelEmail",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown tool '{0}'")]
pub struct UnknownTool(pub String);

impl FromStr for ToolName {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

impl Serialize for ToolName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Parameter kinds advertised in the discovery feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Email,
    DateTime,
    Array,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Text => "text",
            ParamKind::Email => "email",
            ParamKind::DateTime => "datetime",
            ParamKind::Array => "array",
        }
    }
}

/// Static description of one tool. `parameters` serializes as a JSON object
/// whose keys keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub description: &'static str,
    pub parameters: &'static [(&'static str, ParamKind)],
}

impl Serialize for ToolDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Parameters<'a>(&'a [(&'static str, ParamKind)]);

        impl Serialize for Parameters<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, kind) in self.0 {
                    map.serialize_entry(name, kind.as_str())?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("description", self.description)?;
        map.serialize_entry("parameters", &Parameters(self.parameters))?;
        map.end()
    }
}

static CATALOG: [ToolDescriptor; 5] = [
    ToolDescriptor {
        name: ToolName::ResolveContact,
        description: "Resolve contact name to email address",
        parameters: &[("name", ParamKind::Text)],
    },
    ToolDescriptor {
        name: ToolName::ScheduleMeeting,
        description: "Schedule a Google Calendar meeting",
        parameters: &[
            ("summary", ParamKind::Text),
            ("startTime", ParamKind::DateTime),
            ("endTime", ParamKind::DateTime),
            ("attendees", ParamKind::Array),
        ],
    },
    ToolDescriptor {
        name: ToolName::SendEmail,
        description: "Send an email to a recipient",
        parameters: &[
            ("to", ParamKind::Email),
            ("subject", ParamKind::Text),
            ("body", ParamKind::Text),
        ],
    },
    ToolDescriptor {
        name: ToolName::ReplyToEmail,
        description: "Reply to an existing email thread",
        parameters: &[("messageId", ParamKind::Text), ("body", ParamKind::Text)],
    },
    ToolDescriptor {
        name: ToolName::LabelEmail,
        description: "Apply a label to an email",
        parameters: &[
            ("messageId", ParamKind::Text),
            ("labelName", ParamKind::Text),
        ],
    },
];

/// The fixed tool catalog, in discovery order.
pub fn catalog() -> &'static [ToolDescriptor] {
    &CATALOG
}

/// Successful tool invocation body: `{output, tool_name}`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ToolResponse {
    /// Tool result; a string for lookups and acknowledgments, an object for meetings
    pub output: serde_json::Value,
    /// Which tool produced the output
    #[schema(example = "resolveContact")]
    pub tool_name: String,
}

impl ToolResponse {
    pub fn new<T: Serialize>(tool: ToolName, output: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            output: serde_json::to_value(output)?,
            tool_name: tool.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_names_round_trip_through_wire_form() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>(), Ok(tool));
        }
        assert_eq!(
            "deleteEverything".parse::<ToolName>(),
            Err(UnknownTool("deleteEverything".to_string()))
        );
        assert!("ResolveContact".parse::<ToolName>().is_err());
    }

    #[test]
    fn catalog_covers_every_tool_once_in_order() {
        let names: Vec<ToolName> = catalog().iter().map(|d| d.name).collect();
        assert_eq!(names, ToolName::ALL.to_vec());
    }

    #[test]
    fn descriptor_parameters_keep_declaration_order() {
        let descriptor = &catalog()[1];
        let rendered = serde_json::to_string(descriptor).expect("serializable");
        assert_eq!(
            rendered,
            r#"{"name":"scheduleMeeting","description":"Schedule a Google Calendar meeting","parameters":{"summary":"text","startTime":"datetime","endTime":"datetime","attendees":"array"}}"#
        );
    }

    #[test]
    fn tool_response_tags_output_with_tool_name() {
        let response =
            ToolResponse::new(ToolName::ResolveContact, &"alina@example.com").expect("string");
        assert_eq!(
            serde_json::to_value(&response).expect("serializable"),
            json!({"output": "alina@example.com", "tool_name": "resolveContact"})
        );
    }
}
