use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    name: String,
    #[tablecrypt(rename = "name")]
    nickname: String,
    #[partition_key]
    pk: String,
    #[row_key]
    rk: String,
}

fn main() {}
