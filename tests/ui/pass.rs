use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    #[partition_key]
    tenant: String,
    #[row_key]
    email: String,
    #[tablecrypt(encrypt)]
    name: String,
}

fn main() {
    assert_eq!(User::encrypted_properties(), &["name"]);
}
