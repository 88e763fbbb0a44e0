use crate::models::catalog::{ItemDefinition, NewDefinition};
use crate::models::instance::InstanceView;
use crate::models::types::{AccountId, DefinitionId, InstanceId, LobbyId};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts `true`/`false`, `0`/`1` and their string forms. Clients send all of them.
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::Number(n)) => Some(n.as_i64().is_some_and(|v| v != 0)),
        Some(serde_json::Value::String(s)) => match s.trim() {
            "" => None,
            "0" | "false" => Some(false),
            _ => Some(true),
        },
        Some(_) => Some(true),
    })
}

/// Accepts integers, numeric strings and empty strings (as absent).
fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + core::str::FromStr,
    <T as core::str::FromStr>::Err: core::fmt::Display,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("integer out of range")),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().parse::<T>().map(Some).map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!("expected integer, got {other}"))),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub item_id: InstanceId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub version: Option<i64>,
    pub container_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub pos_x: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub pos_y: Option<i32>,
    #[serde(default, deserialize_with = "flag")]
    pub rotated: Option<bool>,
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
}

/// Shared shape of requests that only name an item: rotate, use, drop.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    pub item_id: InstanceId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub version: Option<i64>,
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitRequest {
    pub item_id: InstanceId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub version: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub amount: Option<i32>,
    #[serde(default, deserialize_with = "flag")]
    pub split_half: Option<bool>,
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub source_instance_id: InstanceId,
    pub target_instance_id: InstanceId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub source_version: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub target_version: Option<i64>,
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub item_id: InstanceId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub version: Option<i64>,
    pub recipient_id: AccountId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub amount: Option<i32>,
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
}

/// How a master asks for new instances of a definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueOptions {
    #[serde(default, deserialize_with = "lenient_int")]
    pub amount: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub durability_current: Option<i32>,
    #[serde(default, deserialize_with = "flag")]
    pub random_durability: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueRequest {
    pub lobby_id: Option<LobbyId>,
    pub template_id: DefinitionId,
    pub target_user_id: AccountId,
    #[serde(flatten)]
    pub options: IssueOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetDurabilityRequest {
    pub item_id: InstanceId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub version: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub value: Option<i32>,
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDefinitionRequest {
    pub lobby_id: Option<LobbyId>,
    #[serde(flatten)]
    pub definition: NewDefinition,
    #[serde(default)]
    pub issue_to: Option<AccountId>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub issue_amount: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub durability_current: Option<i32>,
    #[serde(default, deserialize_with = "flag")]
    pub random_durability: Option<bool>,
}

/// Result of a mutating operation. `instance` is the primary item's new canonical state, or
/// `None` when it no longer exists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    pub instance: Option<InstanceView>,
    /// Remaining source stack after a partial merge or transfer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<InstanceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_instance_id: Option<InstanceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_id: Option<InstanceId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<InstanceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_amount: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability_loss: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<ItemDefinition>,
}

impl Outcome {
    pub fn of(view: InstanceView) -> Self {
        Self {
            instance: Some(view),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_accepts_numeric_rotation_and_null_positions() {
        let id = InstanceId::from_u128(5);
        let req: MoveRequest = serde_json::from_value(serde_json::json!({
            "item_id": id,
            "container_id": "hands",
            "pos_x": null,
            "pos_y": null,
            "rotated": 1,
            "version": 3,
        }))
        .unwrap();

        assert_eq!(req.rotated, Some(true));
        assert_eq!(req.pos_x, None);
        assert_eq!(req.version, Some(3));
        assert_eq!(req.lobby_id, None);
    }

    #[test]
    fn issue_accepts_form_style_values() {
        let req: IssueRequest = serde_json::from_value(serde_json::json!({
            "lobby_id": LobbyId::from_u128(1),
            "template_id": DefinitionId::from_u128(2),
            "target_user_id": AccountId::from_u128(3),
            "amount": "4",
            "durability_current": "",
            "random_durability": "1",
        }))
        .unwrap();

        assert_eq!(req.options.amount, Some(4));
        assert_eq!(req.options.durability_current, None);
        assert_eq!(req.options.random_durability, Some(true));
    }

    #[test]
    fn versions_may_arrive_as_strings() {
        let req: MergeRequest = serde_json::from_value(serde_json::json!({
            "source_instance_id": InstanceId::from_u128(1),
            "target_instance_id": InstanceId::from_u128(2),
            "source_version": "3",
            "target_version": 7,
        }))
        .unwrap();
        assert_eq!(req.source_version, Some(3));
        assert_eq!(req.target_version, Some(7));

        let req: ItemRequest = serde_json::from_value(serde_json::json!({
            "item_id": InstanceId::from_u128(1),
            "version": "",
        }))
        .unwrap();
        assert_eq!(req.version, None);
    }
}
