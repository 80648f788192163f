//! List posts from the content API

use anyhow::Result;

use crate::pages::home::{self, PostList};
use crate::Blog;

/// Print the first page of posts, or every post when `all` is set
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let mut list = PostList::new(home::load_initial(blog).await?);

    if all {
        while list.has_more() {
            list.load_more(blog).await?;
        }
    }

    println!("Posts ({}):", list.posts().len());
    for post in list.posts() {
        println!(
            "  {} - {} by {} [{}]",
            post.first_publication_date.as_deref().unwrap_or("unpublished"),
            post.title,
            post.author,
            post.uid.as_deref().unwrap_or("-")
        );
    }

    if let Some(cursor) = list.next_page() {
        println!("More posts at {}", cursor);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_list_all_follows_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, source) = testing::blog(dir.path());

        run(&blog, true).await.unwrap();
        // initial query plus one cursor fetch
        assert_eq!(source.fetches(), 2);
    }
}
