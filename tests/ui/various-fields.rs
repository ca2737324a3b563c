use tablecrypt::TableEntity;

#[derive(Debug, TableEntity)]
struct Everything {
    #[partition_key]
    pk: String,
    #[row_key]
    rk: String,
    #[tablecrypt(encrypt, rename = "Secret")]
    secret: String,
    #[tablecrypt(encrypt)]
    maybe_secret: Option<String>,
    text: String,
    blob: Vec<u8>,
    flag: bool,
    small: i32,
    big: i64,
    ratio: f64,
    when: chrono::DateTime<chrono::Utc>,
    id: uuid::Uuid,
    optional: Option<i64>,
    #[tablecrypt(skip)]
    transient: Vec<String>,
}

fn main() {
    assert_eq!(
        Everything::encrypted_properties(),
        &["Secret", "maybe_secret"]
    );
}
