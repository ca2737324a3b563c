use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    #[tablecrypt(rename = "Timestamp")]
    created: String,
    #[partition_key]
    pk: String,
    #[row_key]
    rk: String,
}

fn main() {}
