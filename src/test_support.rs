//! Feed fixtures shared by unit tests.

use chrono::{Duration, TimeZone, Utc};

/// One WordPress-style item with every field the normalizer touches
pub(crate) fn item_xml(index: usize, pub_date: &str, category: &str) -> String {
    format!(
        r##"<item>
      <title>Story {index}</title>
      <link>https://example.com/story-{index}</link>
      <comments>https://example.com/story-{index}#respond</comments>
      <dc:creator><![CDATA[Staff Writer]]></dc:creator>
      <pubDate>{pub_date}</pubDate>
      <category><![CDATA[{category}]]></category>
      <guid isPermaLink="false">https://example.com/?p={index}</guid>
      <description><![CDATA[<div class="excerpt"><p>Summary of story {index}.</p></div>]]></description>
      <content:encoded><![CDATA[<p>Body {index}</p><div class="npagebreak"><svg width="10"></svg></div><p>Tail {index}</p>]]></content:encoded>
      <enclosure url="https://example.com/{index}.jpg" length="100" type="image/jpeg"/>
      <media:content url="https://example.com/{index}.jpg" medium="image"/>
    </item>"##
    )
}

/// `count` items with strictly decreasing publish times, newest first
pub(crate) fn dated_items(count: usize) -> Vec<String> {
    let newest = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let date = newest - Duration::hours(i as i64);
            item_xml(i, &date.to_rfc2822(), "News")
        })
        .collect()
}

/// A complete feed around the given item elements
pub(crate) fn feed_xml(items: &[String]) -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
    xmlns:content="http://purl.org/rss/1.0/modules/content/"
    xmlns:wfw="http://wellformedweb.org/CommentAPI/"
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:sy="http://purl.org/rss/1.0/modules/syndication/"
    xmlns:slash="http://purl.org/rss/1.0/modules/slash/">
  <channel>
    <title>Example Stories</title>
    <atom:link href="https://example.com/feed/" rel="self" type="application/rss+xml"/>
    <link>https://example.com</link>
    <description>Long-form stories</description>
    <lastBuildDate>Mon, 02 Jun 2025 09:00:00 +0000</lastBuildDate>
    <language>en-US</language>
    <sy:updatePeriod>hourly</sy:updatePeriod>
    <sy:updateFrequency>1</sy:updateFrequency>
    <generator>https://wordpress.org/?v=6.5</generator>
    {items}
  </channel>
</rss>"##,
        items = items.join("\n    ")
    )
}
