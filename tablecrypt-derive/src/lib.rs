extern crate proc_macro2;
extern crate quote;
extern crate syn;

mod settings;
mod table_entity;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(TableEntity, attributes(tablecrypt, partition_key, row_key))]
pub fn derive_table_entity(input: TokenStream) -> TokenStream {
    table_entity::derive_table_entity(parse_macro_input!(input as DeriveInput))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
