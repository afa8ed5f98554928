//! The shop-list parser — categories, packages, products.
//!
//! Each load reads one file, probes its encoding, decodes, parses every
//! record into a fresh list, and only then swaps the fresh list in. A
//! failed load leaves the previously held list untouched, so consumers
//! never see a half-replaced catalog.

use crate::list::encoding::{decode_list_text, default_legacy_encoding};
use crate::list::error::{ListLoadError, ListResult};
use crate::list::records::{
    tokenize_records, RecordLine, ShopCategory, ShopPackage, ShopProduct,
};
use encoding_rs::Encoding;
use std::path::Path;
use tokio::fs;

// Fixed file names under the configured remote/local directories.
pub const SHOP_CATEGORY_FILE: &str = "shopcategory.txt";
pub const SHOP_PACKAGE_FILE: &str = "shoppackage.txt";
pub const SHOP_PRODUCT_FILE: &str = "shopproduct.txt";
pub const SHOP_VERSION_FILE: &str = "shopversion.txt";

/// Owns the three parsed shop lists.
pub struct ShopListParser {
    legacy: &'static Encoding,
    categories: Vec<ShopCategory>,
    packages: Vec<ShopPackage>,
    products: Vec<ShopProduct>,
}

impl Default for ShopListParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopListParser {
    pub fn new() -> Self {
        Self {
            legacy: default_legacy_encoding(),
            categories: Vec::new(),
            packages: Vec::new(),
            products: Vec::new(),
        }
    }

    /// Override the code page assumed for BOM-less files.
    pub fn with_legacy_encoding(mut self, legacy: &'static Encoding) -> Self {
        self.legacy = legacy;
        self
    }

    // ─── Loads ───────────────────────────────────────────────────

    pub async fn load_categories(&mut self, path: &Path) -> ListResult<()> {
        let parsed = self.parse_file(path, ShopCategory::parse).await?;
        self.categories = parsed;
        Ok(())
    }

    pub async fn load_packages(&mut self, path: &Path) -> ListResult<()> {
        let parsed = self.parse_file(path, ShopPackage::parse).await?;
        self.packages = parsed;
        Ok(())
    }

    pub async fn load_products(&mut self, path: &Path) -> ListResult<()> {
        let parsed = self.parse_file(path, ShopProduct::parse).await?;
        self.products = parsed;
        Ok(())
    }

    /// Load all three lists from a directory, first error wins.
    pub async fn load_all(&mut self, dir: &Path) -> ListResult<()> {
        self.load_categories(&dir.join(SHOP_CATEGORY_FILE)).await?;
        self.load_packages(&dir.join(SHOP_PACKAGE_FILE)).await?;
        self.load_products(&dir.join(SHOP_PRODUCT_FILE)).await?;
        log::info!(
            "shop catalog loaded: {} categories, {} packages, {} products",
            self.categories.len(),
            self.packages.len(),
            self.products.len()
        );
        Ok(())
    }

    /// Read, decode, and parse one file into a fresh list.
    async fn parse_file<T>(
        &self,
        path: &Path,
        parse: impl Fn(&RecordLine) -> ListResult<T>,
    ) -> ListResult<Vec<T>> {
        let display = path.display().to_string();
        let bytes = fs::read(path)
            .await
            .map_err(|e| ListLoadError::from(e).with_path(display.clone()))?;
        let (text, detected) = decode_list_text(&bytes, self.legacy);
        log::debug!("parsing {} ({:?} encoding)", display, detected);

        tokenize_records(&text)
            .iter()
            .map(|record| parse(record).map_err(|e| e.with_path(display.clone())))
            .collect()
    }

    // ─── Accessors ───────────────────────────────────────────────

    /// Snapshot valid until the next load call.
    pub fn categories(&self) -> &[ShopCategory] {
        &self.categories
    }

    pub fn packages(&self) -> &[ShopPackage] {
        &self.packages
    }

    pub fn products(&self) -> &[ShopProduct] {
        &self.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::error::ListLoadErrorKind;
    use crate::list::records::CurrencyKind;

    async fn write_fixture(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).await.unwrap();
    }

    async fn write_shop_fixtures(dir: &Path) {
        write_fixture(
            dir,
            SHOP_CATEGORY_FILE,
            "//index name order\n0 \"Featured\" 0\n1 \"Consumables\" 1\nend\n",
        )
        .await;
        write_fixture(
            dir,
            SHOP_PACKAGE_FILE,
            "10 1 \"Small Potion\" 250 0\n11 1 \"Large Potion\" 900 1\nend\n",
        )
        .await;
        write_fixture(
            dir,
            SHOP_PRODUCT_FILE,
            "100 10 \"Potion x5\" 14 0 5\n101 11 \"Potion x20\" 14 0 20\nend\n",
        )
        .await;
    }

    #[tokio::test]
    async fn test_load_all_populates_lists() {
        let dir = tempfile::tempdir().unwrap();
        write_shop_fixtures(dir.path()).await;

        let mut parser = ShopListParser::new();
        parser.load_all(dir.path()).await.unwrap();

        assert_eq!(parser.categories().len(), 2);
        assert_eq!(parser.categories()[0].name, "Featured");
        assert_eq!(parser.packages()[1].currency, CurrencyKind::Points);
        assert_eq!(parser.products()[1].quantity, 20);
    }

    #[tokio::test]
    async fn test_empty_before_first_load() {
        let parser = ShopListParser::new();
        assert!(parser.categories().is_empty());
        assert!(parser.packages().is_empty());
        assert!(parser.products().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_list() {
        let dir = tempfile::tempdir().unwrap();
        write_shop_fixtures(dir.path()).await;

        let mut parser = ShopListParser::new();
        parser.load_all(dir.path()).await.unwrap();

        // Second generation of the file is broken mid-list.
        write_fixture(
            dir.path(),
            SHOP_CATEGORY_FILE,
            "2 \"Valid\" 0\n3 \"Broken\" not_a_number\nend\n",
        )
        .await;

        let err = parser
            .load_categories(&dir.path().join(SHOP_CATEGORY_FILE))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::MalformedRecord);

        // Prior snapshot survives intact.
        assert_eq!(parser.categories().len(), 2);
        assert_eq!(parser.categories()[0].name, "Featured");
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut parser = ShopListParser::new();
        let err = parser
            .load_categories(&dir.path().join(SHOP_CATEGORY_FILE))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::FileMissing);
        assert!(err.path.unwrap().ends_with(SHOP_CATEGORY_FILE));
    }

    #[tokio::test]
    async fn test_utf8_bom_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("0 \"무기\" 0\nend\n".as_bytes());
        fs::write(dir.path().join(SHOP_CATEGORY_FILE), &bytes)
            .await
            .unwrap();

        let mut parser = ShopListParser::new();
        parser
            .load_categories(&dir.path().join(SHOP_CATEGORY_FILE))
            .await
            .unwrap();
        assert_eq!(parser.categories()[0].name, "무기");
    }

    #[tokio::test]
    async fn test_legacy_euc_kr_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        // `0 "한글" 0` + end, with the name in EUC-KR bytes
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"0 \"");
        bytes.extend_from_slice(&[0xC7, 0xD1, 0xB1, 0xDB]);
        bytes.extend_from_slice(b"\" 0\nend\n");
        fs::write(dir.path().join(SHOP_CATEGORY_FILE), &bytes)
            .await
            .unwrap();

        let mut parser = ShopListParser::new();
        parser
            .load_categories(&dir.path().join(SHOP_CATEGORY_FILE))
            .await
            .unwrap();
        assert_eq!(parser.categories()[0].name, "한글");
    }
}
