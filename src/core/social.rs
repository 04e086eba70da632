//! Social content and the loyalty-point flows that feed the rating engine.
//!
//! Posting, voting, gaining fans, and gaining guidees all move loyalty
//! points; every point movement here runs inside a transaction that ends by
//! re-deriving the affected user's star rating, so the persisted rating is
//! never stale. Point amounts come from the configurable `point_values`
//! document. Counter updates are single-statement column-expression updates.

use crate::{
    core::rating,
    core::settings,
    entities::{
        Comment, FanLink, GuideLink, Notification, Post, PostVote, User, comment, fan_link,
        guide_link, notification, post, post_vote, user,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::debug;

/// Registers a new user account.
pub async fn create_user(db: &DatabaseConnection, name: String, email: String) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid("user name cannot be empty"));
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email),
        points: Set(0),
        inherent_points: Set(0),
        star_rating: Set(0),
        is_guide: Set(false),
        commission_balance: Set(0.0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Retrieves a user by id.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Atomically adds a signed delta to a user's earned points.
async fn add_points_atomic<C>(db: &C, user_id: i64, delta: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    User::update_many()
        .col_expr(user::Column::Points, Expr::col(user::Column::Points).add(delta))
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Writes one notification row.
async fn notify<C>(
    db: &C,
    user_id: i64,
    kind: &str,
    from_user_id: i64,
    post_id: Option<i64>,
    message: String,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = notification::ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind.to_string()),
        from_user_id: Set(from_user_id),
        post_id: Set(post_id),
        message: Set(message),
        read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    row.insert(db).await?;
    Ok(())
}

/// Publishes a post and awards the author the configured posting points.
pub async fn create_post(
    db: &DatabaseConnection,
    user_id: i64,
    content: String,
) -> Result<post::Model> {
    if content.trim().is_empty() {
        return Err(Error::invalid("post content cannot be empty"));
    }
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let points = settings::load_point_values(db).await?;

    let txn = db.begin().await?;
    let post = post::ActiveModel {
        user_id: Set(user_id),
        content: Set(content),
        vote_ups: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let post = post.insert(&txn).await?;

    add_points_atomic(&txn, user_id, points.post).await?;
    rating::recompute_user_rating(&txn, user_id).await?;
    txn.commit().await?;

    debug!(user_id, post_id = post.id, "post created");
    Ok(post)
}

/// Edits a post's content. Only the owner may edit.
pub async fn update_post(
    db: &DatabaseConnection,
    post_id: i64,
    user_id: i64,
    content: String,
) -> Result<post::Model> {
    let post = Post::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("post", post_id))?;
    if post.user_id != user_id {
        return Err(Error::forbidden("only the post owner may edit it"));
    }

    let mut active_model: post::ActiveModel = post.into();
    active_model.content = Set(content);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a post with its comments and votes, clawing back the posting
/// points. Only the owner may delete.
pub async fn delete_post(db: &DatabaseConnection, post_id: i64, user_id: i64) -> Result<()> {
    let post = Post::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("post", post_id))?;
    if post.user_id != user_id {
        return Err(Error::forbidden("only the post owner may delete it"));
    }

    let points = settings::load_point_values(db).await?;

    let txn = db.begin().await?;
    Comment::delete_many()
        .filter(comment::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    PostVote::delete_many()
        .filter(post_vote::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    Post::delete_by_id(post_id).exec(&txn).await?;

    add_points_atomic(&txn, user_id, -points.post).await?;
    rating::recompute_user_rating(&txn, user_id).await?;
    txn.commit().await?;

    Ok(())
}

/// Lists posts, newest first.
pub async fn list_posts(db: &DatabaseConnection) -> Result<Vec<post::Model>> {
    Post::find()
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Toggles the voter's up-vote on a post.
///
/// Adding the vote bumps the counter, awards the post owner the configured
/// like points, and notifies them (not when voting one's own post); removing
/// the vote reverses the counter and the points. Returns whether the post is
/// voted after the call.
pub async fn toggle_vote(db: &DatabaseConnection, post_id: i64, voter_id: i64) -> Result<bool> {
    let post = Post::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("post", post_id))?;
    User::find_by_id(voter_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", voter_id))?;

    let points = settings::load_point_values(db).await?;

    let existing = PostVote::find()
        .filter(post_vote::Column::PostId.eq(post_id))
        .filter(post_vote::Column::UserId.eq(voter_id))
        .one(db)
        .await?;

    let txn = db.begin().await?;
    let voted = if let Some(vote) = existing {
        vote.delete(&txn).await?;
        Post::update_many()
            .col_expr(post::Column::VoteUps, Expr::col(post::Column::VoteUps).sub(1))
            .filter(post::Column::Id.eq(post_id))
            .exec(&txn)
            .await?;
        add_points_atomic(&txn, post.user_id, -points.like).await?;
        rating::recompute_user_rating(&txn, post.user_id).await?;
        false
    } else {
        let vote = post_vote::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(voter_id),
            ..Default::default()
        };
        vote.insert(&txn).await?;
        Post::update_many()
            .col_expr(post::Column::VoteUps, Expr::col(post::Column::VoteUps).add(1))
            .filter(post::Column::Id.eq(post_id))
            .exec(&txn)
            .await?;
        add_points_atomic(&txn, post.user_id, points.like).await?;
        rating::recompute_user_rating(&txn, post.user_id).await?;

        if post.user_id != voter_id {
            let voter = User::find_by_id(voter_id).one(&txn).await?;
            let voter_name = voter.map_or_else(String::new, |u| u.name);
            notify(
                &txn,
                post.user_id,
                "like",
                voter_id,
                Some(post_id),
                format!("{voter_name} liked your post"),
            )
            .await?;
        }
        true
    };
    txn.commit().await?;

    Ok(voted)
}

/// Comments on a post, notifying the owner (not on one's own posts).
pub async fn create_comment(
    db: &DatabaseConnection,
    post_id: i64,
    user_id: i64,
    content: String,
) -> Result<comment::Model> {
    let post = Post::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("post", post_id))?;
    let author = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let txn = db.begin().await?;
    let row = comment::ActiveModel {
        post_id: Set(post_id),
        user_id: Set(user_id),
        content: Set(content),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = row.insert(&txn).await?;

    if post.user_id != user_id {
        notify(
            &txn,
            post.user_id,
            "comment",
            user_id,
            Some(post_id),
            format!("{} commented on your post", author.name),
        )
        .await?;
    }
    txn.commit().await?;

    Ok(created)
}

/// Lists a post's comments, newest first.
pub async fn list_comments(db: &DatabaseConnection, post_id: i64) -> Result<Vec<comment::Model>> {
    Comment::find()
        .filter(comment::Column::PostId.eq(post_id))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Makes `fan_id` a fan of `idol_id`, awarding the idol the configured fan
/// points and notifying them. Idempotent: an existing link is left as-is.
pub async fn become_fan(db: &DatabaseConnection, idol_id: i64, fan_id: i64) -> Result<()> {
    if idol_id == fan_id {
        return Err(Error::invalid("cannot be your own fan"));
    }
    User::find_by_id(idol_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", idol_id))?;
    let fan = User::find_by_id(fan_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", fan_id))?;

    let existing = FanLink::find()
        .filter(fan_link::Column::IdolId.eq(idol_id))
        .filter(fan_link::Column::FanId.eq(fan_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let points = settings::load_point_values(db).await?;

    let txn = db.begin().await?;
    let link = fan_link::ActiveModel {
        idol_id: Set(idol_id),
        fan_id: Set(fan_id),
        ..Default::default()
    };
    link.insert(&txn).await?;
    add_points_atomic(&txn, idol_id, points.fan).await?;
    rating::recompute_user_rating(&txn, idol_id).await?;
    notify(
        &txn,
        idol_id,
        "fan",
        fan_id,
        None,
        format!("{} is now your fan", fan.name),
    )
    .await?;
    txn.commit().await?;

    Ok(())
}

/// Removes a fan link, clawing the fan points back. Idempotent.
pub async fn unfan(db: &DatabaseConnection, idol_id: i64, fan_id: i64) -> Result<()> {
    let existing = FanLink::find()
        .filter(fan_link::Column::IdolId.eq(idol_id))
        .filter(fan_link::Column::FanId.eq(fan_id))
        .one(db)
        .await?;
    let Some(link) = existing else {
        return Ok(());
    };

    let points = settings::load_point_values(db).await?;

    let txn = db.begin().await?;
    link.delete(&txn).await?;
    add_points_atomic(&txn, idol_id, -points.fan).await?;
    rating::recompute_user_rating(&txn, idol_id).await?;
    txn.commit().await?;

    Ok(())
}

/// Makes `guidee_id` a guidee of `guide_id`.
///
/// The target must already be a guide. Awards the guide the configured
/// guidee points and notifies them. Idempotent.
pub async fn add_guidee(db: &DatabaseConnection, guide_id: i64, guidee_id: i64) -> Result<()> {
    if guide_id == guidee_id {
        return Err(Error::invalid("cannot be your own guidee"));
    }
    let guide = User::find_by_id(guide_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", guide_id))?;
    if !guide.is_guide {
        return Err(Error::invalid("target user is not a guide"));
    }
    let guidee = User::find_by_id(guidee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", guidee_id))?;

    let existing = GuideLink::find()
        .filter(guide_link::Column::GuideId.eq(guide_id))
        .filter(guide_link::Column::GuideeId.eq(guidee_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let points = settings::load_point_values(db).await?;

    let txn = db.begin().await?;
    let link = guide_link::ActiveModel {
        guide_id: Set(guide_id),
        guidee_id: Set(guidee_id),
        ..Default::default()
    };
    link.insert(&txn).await?;
    add_points_atomic(&txn, guide_id, points.guidee).await?;
    rating::recompute_user_rating(&txn, guide_id).await?;
    notify(
        &txn,
        guide_id,
        "guidee",
        guidee_id,
        None,
        format!("{} is now your guidee", guidee.name),
    )
    .await?;
    txn.commit().await?;

    Ok(())
}

/// Removes a guide/guidee link, clawing the guidee points back. Idempotent.
pub async fn remove_guidee(db: &DatabaseConnection, guide_id: i64, guidee_id: i64) -> Result<()> {
    let existing = GuideLink::find()
        .filter(guide_link::Column::GuideId.eq(guide_id))
        .filter(guide_link::Column::GuideeId.eq(guidee_id))
        .one(db)
        .await?;
    let Some(link) = existing else {
        return Ok(());
    };

    let points = settings::load_point_values(db).await?;

    let txn = db.begin().await?;
    link.delete(&txn).await?;
    add_points_atomic(&txn, guide_id, -points.guidee).await?;
    rating::recompute_user_rating(&txn, guide_id).await?;
    txn.commit().await?;

    Ok(())
}

/// Lists a guide's guidees.
pub async fn list_guidees(db: &DatabaseConnection, guide_id: i64) -> Result<Vec<user::Model>> {
    let links = GuideLink::find()
        .filter(guide_link::Column::GuideId.eq(guide_id))
        .all(db)
        .await?;

    let mut guidees = Vec::with_capacity(links.len());
    for link in links {
        if let Some(user) = User::find_by_id(link.guidee_id).one(db).await? {
            guidees.push(user);
        }
    }
    Ok(guidees)
}

/// Replaces a user's admin-granted points and re-derives their rating.
pub async fn set_inherent_points(
    db: &DatabaseConnection,
    user_id: i64,
    inherent_points: i64,
) -> Result<user::Model> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let txn = db.begin().await?;
    let mut active_model: user::ActiveModel = user.into();
    active_model.inherent_points = Set(inherent_points);
    active_model.update(&txn).await?;
    let updated = rating::recompute_user_rating(&txn, user_id).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Lists a user's notifications, newest first.
pub async fn list_notifications(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks one of the user's notifications as read.
pub async fn mark_notification_read(
    db: &DatabaseConnection,
    notification_id: i64,
    user_id: i64,
) -> Result<()> {
    let row = Notification::find_by_id(notification_id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("notification", notification_id))?;

    let mut active_model: notification::ActiveModel = row.into();
    active_model.read = Set(true);
    active_model.update(db).await?;
    Ok(())
}
