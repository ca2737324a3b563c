use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    #[partition_key]
    tenant: String,
    name: String,
}

fn main() {}
