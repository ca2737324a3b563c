use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct User {
    #[row_key]
    email: String,
    name: String,
}

fn main() {}
