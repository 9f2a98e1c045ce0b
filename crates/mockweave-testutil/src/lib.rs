use mockweave_core::schema::types::*;

/// Blog schema with explicit relations and back-relation arrays, so
/// User/Post, Post/Tag and Post/Comment each form a two-model cycle.
pub fn blog_models() -> ModelMap {
    let mut models = ModelMap::new();

    models.insert(
        Model::new("User")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("email", "String").unique())
            .with_field(Field::scalar("firstName", "String"))
            .with_field(Field::scalar("lastName", "String"))
            .with_field(Field::scalar("bio", "String").optional())
            .with_field(Field::scalar("createdAt", "DateTime"))
            .with_field(Field::scalar("updatedAt", "DateTime"))
            .with_field(Field::relation("posts", "Post").array()),
    );

    models.insert(
        Model::new("Post")
            .with_field(Field::scalar("id", "String").id())
            .with_field(Field::scalar("title", "String"))
            .with_field(Field::scalar("slug", "String").unique())
            .with_field(Field::scalar("content", "String"))
            .with_field(Field::scalar("published", "Boolean"))
            .with_field(Field::scalar("authorId", "Int"))
            .with_field(
                Field::relation("author", "User")
                    .from_fields(&["authorId"])
                    .named("UserPosts"),
            )
            .with_field(Field::relation("tags", "Tag").array())
            .with_field(Field::relation("comments", "Comment").array()),
    );

    models.insert(
        Model::new("Tag")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String").unique())
            .with_field(Field::relation("posts", "Post").array()),
    );

    models.insert(
        Model::new("Comment")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("content", "String"))
            .with_field(Field::scalar("postId", "String"))
            .with_field(Field::relation("post", "Post").from_fields(&["postId"]))
            .with_field(Field::scalar("authorId", "Int"))
            .with_field(Field::relation("author", "User").from_fields(&["authorId"]))
            .with_field(Field::scalar("createdAt", "DateTime")),
    );

    models
}

/// Acyclic ecommerce schema, declared children first.
pub fn ecommerce_models() -> ModelMap {
    let mut models = ModelMap::new();

    models.insert(
        Model::new("OrderItem")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("quantity", "Int"))
            .with_field(Field::scalar("unitPrice", "Decimal"))
            .with_field(Field::scalar("orderId", "String"))
            .with_field(Field::relation("order", "Order").from_fields(&["orderId"]))
            .with_field(Field::scalar("productId", "Int"))
            .with_field(Field::relation("product", "Product").from_fields(&["productId"])),
    );

    models.insert(
        Model::new("Order")
            .with_field(Field::scalar("id", "String").id())
            .with_field(Field::scalar("orderNumber", "String").unique())
            .with_field(
                Field::scalar("status", "String").with_enum(&["PENDING", "PAID", "SHIPPED"]),
            )
            .with_field(Field::scalar("customerId", "Int"))
            .with_field(Field::relation("customer", "Customer").from_fields(&["customerId"]))
            .with_field(Field::scalar("createdAt", "DateTime")),
    );

    models.insert(
        Model::new("Product")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::scalar("sku", "String").unique())
            .with_field(Field::scalar("price", "Float"))
            .with_field(Field::scalar("categoryId", "Int").optional())
            .with_field(
                Field::relation("category", "Category")
                    .from_fields(&["categoryId"])
                    .optional(),
            ),
    );

    models.insert(
        Model::new("Customer")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("email", "String").unique())
            .with_field(Field::scalar("firstName", "String"))
            .with_field(Field::scalar("lastName", "String"))
            .with_field(Field::scalar("phone", "String").optional()),
    );

    models.insert(
        Model::new("Category")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String")),
    );

    models
}

/// Social schema: a self-referencing follower list and a group membership
/// array.
pub fn social_models() -> ModelMap {
    let mut models = ModelMap::new();

    models.insert(
        Model::new("User")
            .with_field(Field::scalar("id", "String").id())
            .with_field(Field::scalar("username", "String").unique())
            .with_field(Field::scalar("avatarUrl", "String").optional())
            .with_field(Field::relation("followers", "User").array().named("Follows")),
    );

    models.insert(
        Model::new("Post")
            .with_field(Field::scalar("id", "String").id())
            .with_field(Field::scalar("content", "String"))
            .with_field(Field::scalar("authorId", "String"))
            .with_field(Field::relation("author", "User").from_fields(&["authorId"])),
    );

    models.insert(
        Model::new("Group")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::relation("members", "User").array()),
    );

    models
}

/// Two models holding required foreign keys to each other.
pub fn strong_pair_models() -> ModelMap {
    let mut models = ModelMap::new();
    models.insert(
        Model::new("Team")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::scalar("captainId", "Int"))
            .with_field(Field::relation("captain", "Player").from_fields(&["captainId"])),
    );
    models.insert(
        Model::new("Player")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::scalar("teamId", "Int"))
            .with_field(Field::relation("team", "Team").from_fields(&["teamId"])),
    );
    models
}

/// The same pair with the `Team -> Player` side optional.
pub fn weak_pair_models() -> ModelMap {
    let mut models = strong_pair_models();
    if let Some(team) = models.models.get_mut("Team") {
        for field in &mut team.fields {
            if field.name == "captainId" || field.name == "captain" {
                field.is_optional = true;
            }
        }
    }
    models
}

/// `A -> B -> C -> A` through required foreign keys.
pub fn triangle_models() -> ModelMap {
    let mut models = ModelMap::new();
    for (name, target) in [("A", "B"), ("B", "C"), ("C", "A")] {
        let fk = format!("{}Id", target.to_lowercase());
        models.insert(
            Model::new(name)
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar(fk.clone(), "Int"))
                .with_field(Field::relation(target.to_lowercase(), target).from_fields(&[fk.as_str()])),
        );
    }
    models
}

/// A category tree: one optional self reference.
pub fn category_tree_models() -> ModelMap {
    let mut models = ModelMap::new();
    models.insert(
        Model::new("Category")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::scalar("parentId", "Int").optional())
            .with_field(
                Field::relation("parent", "Category")
                    .from_fields(&["parentId"])
                    .optional(),
            ),
    );
    models
}

/// Schema without relation flags: relations must be detected from names.
pub fn implicit_blog_models() -> ModelMap {
    let mut models = ModelMap::new();
    models.insert(
        Model::new("Post")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("title", "String"))
            .with_field(Field::scalar("userId", "Int"))
            .with_field(Field::scalar("tagIds", "Int").array()),
    );
    models.insert(
        Model::new("User")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("email", "String").unique()),
    );
    models.insert(
        Model::new("Tag")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("label", "String")),
    );
    models
}

/// `User {id, name, posts: Post[]}` and `Post {id, authorId}` where
/// `authorId` is a unique explicit foreign key.
pub fn user_post_models() -> ModelMap {
    let mut models = ModelMap::new();
    models.insert(
        Model::new("User")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::relation("posts", "Post").array()),
    );
    models.insert(
        Model::new("Post")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("authorId", "Int").unique())
            .with_field(
                Field::relation("author", "User")
                    .from_fields(&["authorId"])
                    .named("posts"),
            ),
    );
    models
}

/// Models whose names and fields share nothing relation-like.
pub fn unrelated_models() -> ModelMap {
    let mut models = ModelMap::new();
    models.insert(
        Model::new("Invoice")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("total", "Decimal"))
            .with_field(Field::scalar("issuedAt", "DateTime")),
    );
    models.insert(
        Model::new("Setting")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("value", "String"))
            .with_field(Field::scalar("enabled", "Boolean")),
    );
    models
}

/// Collect the values of `field` across records as unique keys.
pub fn field_keys(
    records: &[mockweave_core::generate::value::Record],
    field: &str,
) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(field))
        .filter(|v| !v.is_null())
        .map(|v| v.to_unique_key())
        .collect()
}

/// An `IndexMap` of model name to id keys, for membership checks.
pub fn id_index(
    data: &indexmap::IndexMap<String, mockweave_core::generate::engine::GeneratedData>,
) -> indexmap::IndexMap<String, std::collections::HashSet<String>> {
    data.iter()
        .map(|(name, d)| (name.clone(), field_keys(&d.records, "id").into_iter().collect()))
        .collect()
}
