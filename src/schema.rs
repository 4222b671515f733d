table! {
    admin_logins (token) {
        token -> Text,
        username -> Text,
        login_time -> Timestamp,
    }
}

table! {
    days (name) {
        name -> Text,
        order_num -> Integer,
    }
}

table! {
    machines (number) {
        number -> Integer,
        status -> Text,
    }
}

table! {
    slots (id) {
        id -> Integer,
        day_name -> Text,
        time_slot -> Text,
        machine_number -> Integer,
        user_id -> Nullable<Integer>,
    }
}

table! {
    user_logins (token) {
        token -> Text,
        user_id -> Integer,
        login_time -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        surname -> Text,
        room -> Text,
    }
}

joinable!(slots -> machines (machine_number));
joinable!(slots -> users (user_id));
joinable!(user_logins -> users (user_id));

allow_tables_to_appear_in_same_query!(
    admin_logins,
    days,
    machines,
    slots,
    user_logins,
    users,
);
