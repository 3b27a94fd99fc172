use store::schema::{interest, user};
use test_utils::{builder::TestBuilder, factory::user::UserFactory};

use crate::{
    data::{index::IndexRepository, relation::RelationRepository},
    error::AppError,
};

mod replace_tags;

fn sorted(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags
}
