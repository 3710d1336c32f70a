/// Stable identity key of an item (dedup key).
/// Examples: `reddit_pcos`, `facebook_endo_sisters`, `stackexchange_4411`
pub type ItemId = String;
/// Identifier of the adapter that produced a record.
/// Examples: `reddit`, `facebook_manual`, `rss`
pub type SourceId = String;
/// Human-readable platform name attached to items.
/// Examples: `Reddit`, `Twitter/X`, `Stack Exchange`
pub type PlatformName = String;
/// Category label produced by the classifier.
/// Examples: `PCOS`, `Menopause`, `General Women's Health`
pub type CategoryLabel = String;
/// Key name inside a raw record.
/// Examples: `number_members`, `created_utc`, `num_comments`
pub type FieldName = String;
/// Classifier keyword matched as a lowercase substring.
/// Examples: `pcos`, `endo `, `trying to conceive`
pub type Keyword = String;
