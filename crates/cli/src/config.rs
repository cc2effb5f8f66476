//! # arcmint 設定
//!
//! 環境変数（`.env` 対応）またはコマンドライン引数から設定を読み込み、
//! 起動時に一度だけ [`CollectionConfig`] を構築する。以降は読み取り専用で
//! 各コンポーネントに参照で渡す。

use std::fmt;
use std::path::PathBuf;

use arcmint_core::arc69::Arc69Template;
use arcmint_core::input::InputTemplate;
use arcmint_crypto::{Account, Address};
use clap::{Parser, ValueEnum};

use crate::error::MintError;

/// ARC-69の外部URLのデフォルト値
pub const DEFAULT_EXTERNAL_URL: &str = "https://www.shittykitties.art";

/// PinataのAPIエンドポイント
pub const DEFAULT_PINATA_ENDPOINT: &str = "https://api.pinata.cloud";

/// MainNetのalgodエンドポイント
const MAINNET_ENDPOINT: &str = "https://xna-mainnet-api.algonode.cloud";

/// TestNetのalgodエンドポイント
const TESTNET_ENDPOINT: &str = "https://testnet-api.algonode.cloud";

/// algonodeのポート
const ALGONODE_PORT: u16 = 443;

/// 接続先のAlgorandネットワーク。
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    /// MainNet
    #[value(name = "MainNet")]
    MainNet,
    /// TestNet
    #[value(name = "TestNet")]
    TestNet,
}

impl Network {
    /// ネットワークに対応する既定のalgodエンドポイント
    pub fn default_node(self) -> NodeEndpoint {
        let url = match self {
            Network::MainNet => MAINNET_ENDPOINT,
            Network::TestNet => TESTNET_ENDPOINT,
        };
        NodeEndpoint {
            url: url.to_string(),
            port: ALGONODE_PORT,
            token: Secret::default(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::MainNet => f.write_str("MainNet"),
            Network::TestNet => f.write_str("TestNet"),
        }
    }
}

/// ログに出力しない秘密値。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// 秘密値を包む。
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 中身を取り出す。
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// 空か
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// algodの接続先。
#[derive(Debug, Clone)]
pub struct NodeEndpoint {
    /// ベースURL（ポートを含まない）
    pub url: String,
    /// ポート
    pub port: u16,
    /// `X-Algo-API-Token` に送るトークン
    pub token: Secret,
}

/// ピン留めサービスの接続先。
#[derive(Debug, Clone)]
pub struct PinningEndpoint {
    /// ベースURL
    pub url: String,
    /// Bearer認証に使うJWT
    pub jwt: Secret,
}

/// コマンドライン引数。全て環境変数からも指定できる。
#[derive(Debug, Parser)]
#[command(
    name = "arcmint",
    version,
    about = "画像をIPFSにピン留めし、ARC-19/ARC-69のNFTコレクションをAlgorandでミントする"
)]
pub struct Args {
    /// コレクション名（アセット名は "{name} #{index}"）
    #[arg(long, env = "NFT_NAME")]
    pub name: String,

    /// ユニット名プレフィックス（ユニット名は "{prefix}{index}"）
    #[arg(long, env = "NFT_UNIT_NAME")]
    pub unit_name: String,

    /// ARC-69の説明文
    #[arg(long, env = "NFT_DESCRIPTION")]
    pub description: String,

    /// ARC-69の外部URL
    #[arg(long, env = "NFT_EXTERNAL_URL", default_value = DEFAULT_EXTERNAL_URL)]
    pub external_url: String,

    /// コレクションのアイテム数
    #[arg(long, env = "COLLECTION_SIZE")]
    pub collection_size: usize,

    /// 先頭からスキップするアイテム数（再実行用）。
    /// COLLECTION_SIZEを超える値は設定エラーとして起動時に拒否する
    #[arg(long, env = "SKIP_FIRST_N", default_value_t = 0)]
    pub skip_first_n: usize,

    /// 画像とメタデータJSONを含むディレクトリ
    #[arg(long, env = "INPUT_DIR", default_value = "input")]
    pub input_dir: PathBuf,

    /// PinataのJWT
    #[arg(long, env = "PINATA_API_KEY_1", hide_env_values = true)]
    pub pinata_jwt: String,

    /// PinataのAPIエンドポイント
    #[arg(long, env = "PINATA_ENDPOINT", default_value = DEFAULT_PINATA_ENDPOINT)]
    pub pinata_endpoint: String,

    /// 接続先ネットワーク
    #[arg(long, env = "ALGO_NETWORK", value_enum, ignore_case = true, default_value_t = Network::TestNet)]
    pub network: Network,

    /// algodのベースURL（既定はネットワークごとのalgonode）
    #[arg(long, env = "ALGOD_ENDPOINT")]
    pub algod_endpoint: Option<String>,

    /// algodのポート
    #[arg(long, env = "ALGOD_PORT")]
    pub algod_port: Option<u16>,

    /// algodのAPIトークン
    #[arg(long, env = "ALGOD_TOKEN", hide_env_values = true)]
    pub algod_token: Option<String>,

    /// 作成者アドレス
    #[arg(long, env = "CREATOR_ADDRESS")]
    pub creator_address: String,

    /// 作成者の25単語ニーモニック
    #[arg(long, env = "CREATOR_PASSPHRASE", hide_env_values = true)]
    pub creator_passphrase: String,
}

/// 実行全体で共有する読み取り専用の設定。
#[derive(Debug)]
pub struct CollectionConfig {
    /// コレクション名
    pub name: String,
    /// ユニット名プレフィックス
    pub unit_prefix: String,
    /// ARC-69の説明文
    pub description: String,
    /// ARC-69の外部URL
    pub external_url: String,
    /// 期待するアイテム数
    pub collection_size: usize,
    /// 先頭からスキップするアイテム数
    pub skip_first_n: usize,
    /// 入力ディレクトリ
    pub input_dir: PathBuf,
    /// 接続先ネットワーク
    pub network: Network,
    /// algodの接続先
    pub node: NodeEndpoint,
    /// ピン留めサービスの接続先
    pub pinning: PinningEndpoint,
    /// 作成者アカウント（ニーモニックから導出）
    pub creator: Account,
}

fn require(field: &str, value: String) -> Result<String, MintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MintError::Configuration(format!("{field}が設定されていません")));
    }
    Ok(trimmed.to_string())
}

impl CollectionConfig {
    /// 引数を検証して設定を構築する。
    ///
    /// 必須値の欠落、アイテム数0、ニーモニックから導出したアドレスと
    /// `CREATOR_ADDRESS` の不一致は [`MintError::Configuration`] とする。
    pub fn from_args(args: Args) -> Result<Self, MintError> {
        let name = require("NFT_NAME", args.name)?;
        let unit_prefix = require("NFT_UNIT_NAME", args.unit_name)?;
        let description = require("NFT_DESCRIPTION", args.description)?;
        let pinata_jwt = require("PINATA_API_KEY_1", args.pinata_jwt)?;
        let creator_address = require("CREATOR_ADDRESS", args.creator_address)?;
        let creator_passphrase = require("CREATOR_PASSPHRASE", args.creator_passphrase)?;

        if args.collection_size == 0 {
            return Err(MintError::Configuration(
                "COLLECTION_SIZEは1以上である必要があります".to_string(),
            ));
        }

        let expected: Address = creator_address.parse()?;
        let creator = Account::from_mnemonic(&creator_passphrase)?;
        if creator.address() != expected {
            return Err(MintError::Configuration(format!(
                "CREATOR_PASSPHRASEから導出したアドレス {} がCREATOR_ADDRESS {} と一致しません",
                creator.address(),
                expected
            )));
        }

        let mut node = args.network.default_node();
        if let Some(url) = args.algod_endpoint {
            node.url = url;
        }
        if let Some(port) = args.algod_port {
            node.port = port;
        }
        if let Some(token) = args.algod_token {
            node.token = Secret::new(token);
        }

        Ok(Self {
            name,
            unit_prefix,
            description,
            external_url: args.external_url,
            collection_size: args.collection_size,
            skip_first_n: args.skip_first_n,
            input_dir: args.input_dir,
            network: args.network,
            node,
            pinning: PinningEndpoint {
                url: args.pinata_endpoint,
                jwt: Secret::new(pinata_jwt),
            },
            creator,
        })
    }

    /// 入力ローダーに渡す命名規則とARC-69固定値
    pub fn input_template(&self) -> InputTemplate {
        InputTemplate {
            name: self.name.clone(),
            unit_prefix: self.unit_prefix.clone(),
            arc69: Arc69Template {
                description: self.description.clone(),
                external_url: self.external_url.clone(),
            },
        }
    }
}
