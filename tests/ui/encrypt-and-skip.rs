use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    #[tablecrypt(encrypt, skip)]
    secret: String,
    #[partition_key]
    pk: String,
    #[row_key]
    rk: String,
}

fn main() {}
