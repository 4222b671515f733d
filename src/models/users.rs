use crate::schema::users;

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct UserData {
    pub id: i32,
    pub surname: String,
    pub room: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub surname: &'a str,
    pub room: &'a str,
}
