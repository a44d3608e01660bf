// kernel/src/mem/mod.rs
//
// 役割:
// - メモリ関連のサブモジュールをまとめる中継点。
// - section.rs (copy/zero table) と region.rs (カーネル用メモリ領域) を公開する。

pub mod region;
pub mod section;
