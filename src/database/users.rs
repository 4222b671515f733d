use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error::DatabaseError},
    SqliteConnection,
};

use crate::models::users::{NewUser, UserData};

/// Resolves `(surname, room)` to a user, creating it on first sight. A
/// uniqueness conflict on insert means the user already exists.
pub fn find_or_create_user(
    conn: &mut SqliteConnection,
    surname: &str,
    room: &str,
) -> QueryResult<UserData> {
    use crate::schema::users;

    match diesel::insert_into(users::table)
        .values(NewUser { surname, room })
        .execute(conn)
    {
        Ok(_) => tracing::info!(surname, room, "registered new user"),
        Err(DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            tracing::debug!(surname, room, "user already exists")
        }
        Err(err) => return Err(err),
    }

    users::table
        .filter(users::surname.eq(surname))
        .filter(users::room.eq(room))
        .first::<UserData>(conn)
}
