//! Testnet gossip captured from the network, with the type prefix.

/// A channel_announcement for 1288457x3x0
pub const CHAN_ANN_1288457: &str = "0100ce1d69dbb62e86ad28157f4c24705e325f069d5158b91b28bdf55e508afcc1b554a498f4bda8a3d34a206ddb617ad0e945ecadc9a61086bac5afae3e19976242d464e8d305772f29021a4d07617c4159e7e0634bd53991c0e0577c0e9c3d3ee61d7311e6773275335c12f17e573e2813391a71050ab58c03c17d06c0d841db2ec6c6514c2156713651dfbee13d491559764c95343386218ab904173742dde6ca3118d303967e073a44e94f16eef4d878d4d74f1ff1f6924109421cf9c41e8e5c961cf1c7e2316e61a952c7caad056fea1d13d2f4bf855bd3f06d019a33814bc70ea99fa79f026c791b87040e781e8493f5165dafbfc23fabe2912c3ed0ab7e0f000043497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a9090000030000036b96e4713c5f84dcb8030592e1bd42a2d9a43d91fa2e535b9bfd05f2c5def9b9039cc950286a8fa99218283d1adc2456e0d5e81be558da77dd6e85ba9a1fff5ad303ca63b9acbadf5b644c11d0a9dd65b82b14e0d26fc5e0bcf071a90879f603d46203a0ee0a716f4a436864fe53bb788a003321aee63150bf63fd5529e4e1da93481d";

/// A channel_update for 1288457x3x0, direction 0, disabled
pub const CHAN_UPD_1288457_DIR0: &str = "01024e6eac97124742ba6a033612c8009945c0d52568756a885692b4adbf202666503b56ecb6f5758ea450dda940b2a6853b8e1706c3bd4f38a347be91b08c5e5c4743497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a90900000300005cdd9d780002009000000000000003e8000003e800000001";

/// A node_announcement for node 2 of 1288457x3x0 (alias yalls.org)
pub const NODE_ANN_039CC9: &str = "01015254ffbc21374af9d998355151515933de1d998e9cb124aa4d65a7aa6b473e75201420c58f2414f4fb7461f3f133ab529cbbf9a57365ed6bcf775172826fdc7500005ae86dba039cc950286a8fa99218283d1adc2456e0d5e81be558da77dd6e85ba9a1fff5ad3f8e71c79616c6c732e6f7267000000000000000000000000000000000000000000000000070122c8fc922607";

/// A channel_update for 1288457x3x0, direction 1
pub const CHAN_UPD_1288457_DIR1: &str = "0102fcd0d7af22e815879e2ba0c2422bc812d04f8b286fd53e631fe18bb6ed5aecc06a0b96fceb352509656f2b121b76cc808fe02e62ff42edc600bd6e196fe2af9b43497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a90900000300005ae7cc490001009000000000000003e8000003e800000001";

/// A node_announcement for node 1 of every fixture channel
pub const NODE_ANN_036B96: &str = "010105d3b12aacb824409ce8724609fe453fdcd33a498ecca170784985c4a6a2765657c4ef9e1170d3a5795ec86021c3a081c84a9f3a02e2ca66d17b683baacae08000005cddd5e5036b96e4713c5f84dcb8030592e1bd42a2d9a43d91fa2e535b9bfd05f2c5def9b9b6d43364656d6f312e6c6e646578706c6f7265722e636f6d0000000000000000000000000701265736a32611";

/// A channel_announcement for 1288462x3x0
pub const CHAN_ANN_1288462: &str = "01009b33af5fe59b236b2383ed442fa7c1361a68fe13f89f9c9712ae04b9eb13ce962584851bedf84b9682ed3c351828164d6f24fcdaf1ad577f6378c170fb68a1fac5daa19b89932d2aeaa0327aaf7da830e5b15e0d033fa62613e2a35b67fc53d02ab5f2335733dda30ba24751f33d229af579927e09a94a619dd4a4626615f1c1de45fdf85a1702805d0708bc676ddfb99b27308ea6e12fd76200c65a01c4d9fe7d9e96f20e09949d539fedeaf88cea8a2df7d28a4ddcb622559ccf1624ba61f4270e93a347b0c8329ec6c6162e450ebc0fe07611ff90d33f5b0fb9466ea306ec30e4bf688d619c903c79eacd0e05ae91ec84e370d4e572b100c19f4a3d53e172000043497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a90e0000030000036b96e4713c5f84dcb8030592e1bd42a2d9a43d91fa2e535b9bfd05f2c5def9b903e5f9d1935c67a029bf0a26af5f63109f4f4c45993a8f45177a8f2f39bcb46144033164d62ebff9e5c20b524dd796251113e5fe93bdafced041159cc0df8e95a28b03a3d66f3f59bf350ae414d2cc510899c684801ebd61b3b9fcf22731462ed9d80e";

/// A channel_update for 1288462x3x0, direction 0
pub const CHAN_UPD_1288462_DIR0: &str = "0102e14445d2d0b70febe1b0d01ecee102947a0e39334ecce7294cff9d0d452dd59f41f2218f6e2f35c7d891efeb9581076f1da97c0993ffaef7bec60b394b9c219a43497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a90e00000300005cdd9d780002009000000000000003e8000003e800000001";

/// A node_announcement for node 2 of 1288462x3x0
pub const NODE_ANN_03E5F9: &str = "0101743a72dcd1c0e53ae8a50ba181c4ef43c5e46003b101206ea661807ecd5c91d5631439c6fa81f9bf432b678ca89ace4b7904c9562dee2477b8eb288e0daaff8800005b036c8703e5f9d1935c67a029bf0a26af5f63109f4f4c45993a8f45177a8f2f39bcb461443399ff49736c616e64445350000000000000000000000000000000000000000000000000070154f6c87a2607";

/// A channel_update for 1288462x3x0, direction 1
pub const CHAN_UPD_1288462_DIR1: &str = "01027907d0a52a155fb4fbc4504823a8fc4bc709f1adbd42cc503b9c1d347f8903ef46a9ef3b0bbcd4cee122199456825232484547b6d9985fbe02bb2f20a388574d43497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a90e00000300005b02fd3c0001009000000000000003e8000003e800000001";

/// A channel_announcement for 1288470x4x0
pub const CHAN_ANN_1288470: &str = "010027927395fe531904ecae995006cbbfe1338482c23008bc46a357a4f629cc47dd0f85651fbe47f779dcfab1cd4908de6a66843b364d6dfc848eb3e5459d00eab5b9674df33652a36bdac711098fdd2adb97d0bfd6f134ac1f9caa420919bfb55d17c3c606d468da05ff0054b40e41e7f4be93f793101b625f68d7124ccd70bc7315df61709a912458e6a378420b1a44ef914062f9a14c84b61226898d6e81a4be31a27e7b19237001c189e523bebd51af289520ff935b98db5426d5b22b1ac56fb063dd7a82583211185fea8bd7a47f1dec88fbda2377f76dfc253cc85e7c33231023d6647f1379e84ff36b4286edd1a2a71f817964bb16f0fd19254ce6441d5a000043497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a9160000040000036b96e4713c5f84dcb8030592e1bd42a2d9a43d91fa2e535b9bfd05f2c5def9b903c3feb1e9b84d7aa83ea93f1bc58bfe34fa17603d955eb723a9d236336d97f9e9028154cc6b7fb5e58e0bf989de51b8d946183918c5aa08f361825a2b9e767783b803338034d89e56588f7117653074c4ee1920082d53b20710b2578e0d3f08dcfc33";

/// A channel_update for 1288470x4x0, direction 0
pub const CHAN_UPD_1288470_DIR0: &str = "010235c2ad228465af3f48775b82df1ae59470bf6c9c84cdda10b27c2ec236c4824068cc22211b095e4d44fdfa789b7ad366a09db484a064065b12a1a342846a1e6043497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a91600000400005cdd9d78000200900000000000000001000003e800000001";

/// A node_announcement for node 2 of 1288470x4x0
pub const NODE_ANN_03C3FE: &str = "01012a3a1da3a63d40c3816acb5827d5e118d8c36d435959c3bcb9d8da934b992fcb515a363dfaa9de826274481a8e96b882d3244d4c547c9ffb68c0f11ad0ab989f00005aa890d003c3feb1e9b84d7aa83ea93f1bc58bfe34fa17603d955eb723a9d236336d97f9e9ffff005341432d4368696e6100000000000000000000000000000000000000000000000007012f5ea5f22607";

/// [`CHAN_ANN_1288457`] with the last byte of `bitcoin_key_2` altered, so the
/// key is no longer a curve point
pub const CHAN_ANN_1288457_BAD_KEY: &str = "0100ce1d69dbb62e86ad28157f4c24705e325f069d5158b91b28bdf55e508afcc1b554a498f4bda8a3d34a206ddb617ad0e945ecadc9a61086bac5afae3e19976242d464e8d305772f29021a4d07617c4159e7e0634bd53991c0e0577c0e9c3d3ee61d7311e6773275335c12f17e573e2813391a71050ab58c03c17d06c0d841db2ec6c6514c2156713651dfbee13d491559764c95343386218ab904173742dde6ca3118d303967e073a44e94f16eef4d878d4d74f1ff1f6924109421cf9c41e8e5c961cf1c7e2316e61a952c7caad056fea1d13d2f4bf855bd3f06d019a33814bc70ea99fa79f026c791b87040e781e8493f5165dafbfc23fabe2912c3ed0ab7e0f000043497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a9090000030000036b96e4713c5f84dcb8030592e1bd42a2d9a43d91fa2e535b9bfd05f2c5def9b9039cc950286a8fa99218283d1adc2456e0d5e81be558da77dd6e85ba9a1fff5ad303ca63b9acbadf5b644c11d0a9dd65b82b14e0d26fc5e0bcf071a90879f603d46203a0ee0a716f4a436864fe53bb788a003321aee63150bf63fd5529e4e1da934810";

/// [`CHAN_UPD_1288457_DIR0`] with `fee_proportional_millionths` altered after signing
pub const CHAN_UPD_1288457_DIR0_BAD_SIG: &str = "01024e6eac97124742ba6a033612c8009945c0d52568756a885692b4adbf202666503b56ecb6f5758ea450dda940b2a6853b8e1706c3bd4f38a347be91b08c5e5c4743497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea33090000000013a90900000300005cdd9d780002009000000000000003e8000003e800000000";

/// [`NODE_ANN_039CC9`] with its port altered after signing
pub const NODE_ANN_039CC9_BAD_SIG: &str = "01015254ffbc21374af9d998355151515933de1d998e9cb124aa4d65a7aa6b473e75201420c58f2414f4fb7461f3f133ab529cbbf9a57365ed6bcf775172826fdc7500005ae86dba039cc950286a8fa99218283d1adc2456e0d5e81be558da77dd6e85ba9a1fff5ad3f8e71c79616c6c732e6f7267000000000000000000000000000000000000000000000000070122c8fc922600";

/// Funding script of the 1288457 channel
pub const FUNDING_SCRIPT_1288457: &str = "0020fdef2b21b827959dcaf3d31f8f0f859cd81ec5d335614ed4e338cdf8ce9d6fcb";

/// Funding script of the 1288462 channel
pub const FUNDING_SCRIPT_1288462: &str = "002040afbae59ad7557ac65f95919f61be963a890ddb9eb9b7bbd1405b9b4ba40576";

/// Funding script of the 1288470 channel
pub const FUNDING_SCRIPT_1288470: &str = "0020ed341bc65acb4dab8727fe1c5bfbd028f7e5f1b52700b7b5e17eae0ad30fd45f";

/// The valid fixtures in capture order: three channel announcements, five
/// channel updates and four node announcements
pub const VALID_GOSSIP: [&str; 12] = [
    CHAN_ANN_1288457,
    CHAN_UPD_1288457_DIR0,
    NODE_ANN_039CC9,
    CHAN_UPD_1288457_DIR1,
    NODE_ANN_036B96,
    CHAN_ANN_1288462,
    CHAN_UPD_1288462_DIR0,
    NODE_ANN_03E5F9,
    CHAN_UPD_1288462_DIR1,
    CHAN_ANN_1288470,
    CHAN_UPD_1288470_DIR0,
    NODE_ANN_03C3FE,
];
