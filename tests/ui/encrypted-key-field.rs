use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    #[partition_key]
    #[tablecrypt(encrypt)]
    tenant: String,
    #[row_key]
    email: String,
}

fn main() {}
