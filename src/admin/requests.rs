use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct AdminRequest {
    pub login_token: String,
    #[serde(flatten)]
    pub action: AdminAction,
}

/// Selected by the `action` field of the request body.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    View,
    Reset,
    FactoryReset,
    AddTime {
        new_time: String,
    },
    RemoveTime {
        time_slot: String,
    },
    EditTime {
        time_slot: String,
        new_time: String,
    },
    AddDay {
        new_day: String,
    },
    RemoveDay {
        day: String,
    },
    EditDay {
        day: String,
        new_day: String,
    },
    AddMachine,
    RemoveMachine {
        machine: i32,
    },
    ToggleMachine {
        machine: i32,
    },
    Edit {
        day: String,
        time_slot: String,
        machine: i32,
        #[serde(default)]
        new_value: String,
    },
    ExportWord,
}
